// SPDX-License-Identifier: GPL-3.0-only

//! Usage computation orchestration

use tracing::{debug, info};

use rbd_types::{ImageUsage, UsageReport};

use crate::cluster::{ClusterBackend, ConnectionManager};
use crate::config::ClusterCredentials;
use crate::error::Result;
use crate::scan::{ScanOutcome, scan_used_bytes};

/// Computes a [`UsageReport`] for one image in one pool
///
/// Each `compute` call owns a fresh connect/disconnect cycle; sessions are
/// never reused across invocations and no process-wide state is touched.
pub struct ImageUsageCalculator<'a> {
    backend: &'a dyn ClusterBackend,
    credentials: ClusterCredentials,
}

impl<'a> ImageUsageCalculator<'a> {
    pub fn new(backend: &'a dyn ClusterBackend, credentials: ClusterCredentials) -> Self {
        Self {
            backend,
            credentials,
        }
    }

    /// Compute the usage report for `image_name` within `pool_name`
    ///
    /// The session is released on every exit path: the guard returned by
    /// [`ConnectionManager::connect`] disconnects from `Drop` when any of
    /// the later steps fails, and explicitly on the success path. The image
    /// handle drops before the session is released, keeping the handles in
    /// reverse acquisition order.
    pub fn compute(&self, pool_name: &str, image_name: &str) -> Result<UsageReport> {
        let manager = ConnectionManager::new(self.backend);
        let mut session = manager.connect(&self.credentials, pool_name)?;

        let (stat, used_size) = {
            let image = session.open_image(image_name)?;
            let stat = image.stat()?;
            debug!(
                image = image_name,
                size = stat.size,
                id = %stat.id,
                "image opened"
            );

            let used_size = match scan_used_bytes(image.as_ref(), stat.size) {
                ScanOutcome::Scanned(bytes) => bytes,
                ScanOutcome::FallbackFull => stat.size,
            };
            (stat, used_size)
        };

        session.disconnect();

        info!(
            pool = pool_name,
            image = image_name,
            provisioned_size = stat.size,
            used_size,
            "usage computed"
        );

        Ok(UsageReport {
            images: vec![ImageUsage {
                name: image_name.to_string(),
                id: stat.id,
                size: stat.size,
                provisioned_size: stat.size,
                used_size,
            }],
            total_provisioned_size: stat.size,
            total_used_size: used_size,
        })
    }
}
