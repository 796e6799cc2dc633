// SPDX-License-Identifier: GPL-3.0-only

//! RBD image disk-usage computation
//!
//! This library answers one question about a named block-storage image in a
//! distributed storage cluster: how much of its provisioned capacity is
//! actually backed by allocated data. It speaks the cluster's native client
//! protocol through a pluggable backend instead of shelling out to the
//! `rbd du` command-line tool.
//!
//! A computation is one strictly sequential connect → open → scan → close →
//! disconnect cycle; no session is reused across invocations and no global
//! state is touched, so independent computations may run in parallel at the
//! caller's discretion.
//!
//! The production backend binds librados/librbd and is gated behind the
//! `rados` cargo feature; everything above the [`cluster::ClusterBackend`]
//! seam is backend-agnostic and testable in memory.

pub mod cluster;
pub mod config;
pub mod error;
pub mod report;
pub mod scan;
pub mod usage;

#[cfg(feature = "rados")]
pub mod backend;

pub use cluster::{ClusterBackend, ClusterSession, ConnectionManager, ImageHandle, SessionGuard};
pub use config::ClusterCredentials;
pub use error::{RbdError, Result};
pub use report::summarize;
pub use scan::{ScanOutcome, scan_used_bytes};
pub use usage::ImageUsageCalculator;

// Re-export shared models
pub use rbd_types::{ExtentRecord, ImageStat, ImageUsage, UsageReport, UsageSummary};

#[cfg(feature = "rados")]
pub use backend::RadosBackend;
