// SPDX-License-Identifier: GPL-3.0-only

//! Flat summary shape published to callers

use serde::{Deserialize, Serialize};

use crate::usage::UsageReport;

/// Flattened view of a [`UsageReport`] for a single image
///
/// Always well-formed: when the source report carried no image entry, the
/// sizes are zero and `error` describes the condition instead of a second
/// failure mode at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageSummary {
    /// Image name
    pub name: String,

    /// Declared capacity in bytes
    pub provisioned_size: u64,

    /// Allocated bytes (or the fallback full size)
    pub used_size: u64,

    /// Pool the image was queried in
    pub pool: String,

    /// The unmodified nested report this summary was derived from
    pub raw_data: UsageReport,

    /// Present only when the report lacked image data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_report() -> UsageReport {
        UsageReport {
            images: Vec::new(),
            total_provisioned_size: 0,
            total_used_size: 0,
        }
    }

    #[test]
    fn error_key_absent_when_none() {
        let summary = UsageSummary {
            name: "vol-1".into(),
            provisioned_size: 100,
            used_size: 50,
            pool: "rbd".into(),
            raw_data: empty_report(),
            error: None,
        };

        let json = serde_json::to_string(&summary).expect("serialize summary");
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn error_key_present_when_set() {
        let summary = UsageSummary {
            name: "vol-1".into(),
            provisioned_size: 0,
            used_size: 0,
            pool: "rbd".into(),
            raw_data: empty_report(),
            error: Some("no image data".into()),
        };

        let json = serde_json::to_string(&summary).expect("serialize summary");
        assert!(json.contains("\"error\":\"no image data\""));
    }
}
