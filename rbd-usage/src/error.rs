// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Error types for usage computations
///
/// Recoverable conditions are not represented here: a failed extent walk
/// degrades to a fallback value inside [`crate::scan`], and a report without
/// image data degrades to an `error` field on the summary.
#[derive(Error, Debug)]
pub enum RbdError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cluster connection failed: {0}")]
    Connection(String),

    #[error("authentication rejected: {0}")]
    Authentication(String),

    #[error("pool not found: {0}")]
    PoolNotFound(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("operation failed: {0}")]
    Operation(String),
}

/// Result type alias for usage computations
pub type Result<T> = std::result::Result<T, RbdError>;
