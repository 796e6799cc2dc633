// SPDX-License-Identifier: GPL-3.0-only

//! Report flattening

use rbd_types::{UsageReport, UsageSummary};

/// Flatten a [`UsageReport`] into the published summary shape
///
/// Pure and total: a report without image entries yields a zeroed summary
/// carrying an `error` string, so the boundary always hands out a
/// well-formed structure. The nested `raw_data` is the report unmodified.
pub fn summarize(report: &UsageReport, image_name: &str, pool_name: &str) -> UsageSummary {
    match report.images.first() {
        Some(entry) => UsageSummary {
            name: entry.name.clone(),
            provisioned_size: entry.provisioned_size,
            used_size: entry.used_size,
            pool: pool_name.to_string(),
            raw_data: report.clone(),
            error: None,
        },
        None => UsageSummary {
            name: image_name.to_string(),
            provisioned_size: 0,
            used_size: 0,
            pool: pool_name.to_string(),
            raw_data: report.clone(),
            error: Some("no image data found in response".to_string()),
        },
    }
}
