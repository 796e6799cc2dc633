// SPDX-License-Identifier: GPL-3.0-only

//! Canonical data models for RBD image usage reporting
//!
//! This crate defines the types shared between the usage computation library
//! and its consumers:
//!
//! - **rbd-usage**: Produces `UsageReport`/`UsageSummary` from a live cluster
//! - **rbd-du**: Serializes these types as the stable JSON output contract
//!
//! Field names are part of the published JSON schema and must not change.

pub mod report;
pub mod usage;

pub use report::UsageSummary;
pub use usage::{ExtentRecord, ImageStat, ImageUsage, UsageReport};
