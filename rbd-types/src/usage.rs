// SPDX-License-Identifier: GPL-3.0-only

//! Image metadata and usage report models

use serde::{Deserialize, Serialize};

/// Image metadata snapshot taken at open time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageStat {
    /// Provisioned capacity in bytes (the declared address space)
    pub size: u64,

    /// Opaque cluster-internal image identifier
    pub id: String,
}

/// A contiguous byte range reported while walking an image's extent map
///
/// Ranges arrive in non-overlapping, monotonically increasing offset order;
/// consumers rely on the source iterator's contract and do not re-sort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtentRecord {
    /// Start offset of the range within the image
    pub offset: u64,

    /// Length of the range in bytes
    pub length: u64,

    /// Whether the range is backed by allocated data
    pub exists: bool,
}

/// Per-image entry of a usage report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUsage {
    /// Image name within the pool
    pub name: String,

    /// Cluster-internal image identifier
    pub id: String,

    /// Declared size in bytes
    pub size: u64,

    /// Provisioned capacity in bytes (equals `size`)
    pub provisioned_size: u64,

    /// Bytes backed by allocated extents, or the full provisioned size
    /// when extent iteration was unavailable
    pub used_size: u64,
}

/// Usage report for a single-image query
///
/// Models one image per request, so `images` holds exactly one entry and the
/// totals equal that entry's corresponding fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageReport {
    pub images: Vec<ImageUsage>,
    pub total_provisioned_size: u64,
    pub total_used_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_report_roundtrips() {
        let report = UsageReport {
            images: vec![ImageUsage {
                name: "vol-1".into(),
                id: "abc123".into(),
                size: 1024,
                provisioned_size: 1024,
                used_size: 512,
            }],
            total_provisioned_size: 1024,
            total_used_size: 512,
        };

        let json = serde_json::to_string(&report).expect("serialize report");
        let parsed: UsageReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(parsed, report);
    }

    #[test]
    fn report_json_uses_stable_field_names() {
        let report = UsageReport {
            images: Vec::new(),
            total_provisioned_size: 0,
            total_used_size: 0,
        };

        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"images\""));
        assert!(json.contains("\"total_provisioned_size\""));
        assert!(json.contains("\"total_used_size\""));
    }
}
