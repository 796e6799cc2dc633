// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end pipeline tests against an in-memory cluster backend:
//! compute → summarize → published JSON shape.

use rbd_types::{ExtentRecord, ImageStat};
use rbd_usage::{
    ClusterBackend, ClusterCredentials, ClusterSession, ImageHandle, ImageUsageCalculator,
    RbdError, Result, summarize,
};

const GIB: u64 = 1 << 30;

/// One pool of named images, each a list of allocated ranges over a
/// declared size.
struct MemoryCluster {
    pool: String,
    images: Vec<MemoryImage>,
}

#[derive(Clone)]
struct MemoryImage {
    name: String,
    id: String,
    size: u64,
    extents: Vec<ExtentRecord>,
}

impl ClusterBackend for MemoryCluster {
    fn connect(
        &self,
        _credentials: &ClusterCredentials,
        pool_name: &str,
    ) -> Result<Box<dyn ClusterSession>> {
        if pool_name != self.pool {
            return Err(RbdError::PoolNotFound(pool_name.to_string()));
        }
        Ok(Box::new(MemorySession {
            images: self.images.clone(),
        }))
    }
}

struct MemorySession {
    images: Vec<MemoryImage>,
}

impl ClusterSession for MemorySession {
    fn open_image(&mut self, image_name: &str) -> Result<Box<dyn ImageHandle + '_>> {
        self.images
            .iter()
            .find(|image| image.name == image_name)
            .cloned()
            .map(|image| Box::new(image) as Box<dyn ImageHandle>)
            .ok_or_else(|| RbdError::ImageNotFound(image_name.to_string()))
    }

    fn disconnect(&mut self) {}
}

impl ImageHandle for MemoryImage {
    fn stat(&self) -> Result<ImageStat> {
        Ok(ImageStat {
            size: self.size,
            id: self.id.clone(),
        })
    }

    fn diff_iterate(
        &self,
        _offset: u64,
        _length: u64,
        visit: &mut dyn FnMut(ExtentRecord),
    ) -> Result<()> {
        for record in &self.extents {
            visit(*record);
        }
        Ok(())
    }
}

fn cluster() -> MemoryCluster {
    MemoryCluster {
        pool: "pool-A".to_string(),
        images: vec![MemoryImage {
            name: "csi-vol-1".to_string(),
            id: "1234abcd".to_string(),
            size: 10 * GIB,
            extents: vec![
                ExtentRecord {
                    offset: 0,
                    length: GIB,
                    exists: true,
                },
                ExtentRecord {
                    offset: GIB,
                    length: 9 * GIB,
                    exists: false,
                },
            ],
        }],
    }
}

fn credentials() -> ClusterCredentials {
    ClusterCredentials::new(
        vec!["10.0.0.1:6789".into(), "10.0.0.2:6789".into()],
        "secret",
        "client.admin",
    )
    .expect("test credentials are valid")
}

#[test]
fn computes_and_summarizes_a_partially_allocated_image() {
    let backend = cluster();
    let calculator = ImageUsageCalculator::new(&backend, credentials());

    let report = calculator
        .compute("pool-A", "csi-vol-1")
        .expect("compute succeeds");
    let summary = summarize(&report, "csi-vol-1", "pool-A");

    assert_eq!(summary.name, "csi-vol-1");
    assert_eq!(summary.pool, "pool-A");
    assert_eq!(summary.provisioned_size, 10 * GIB);
    assert_eq!(summary.used_size, GIB);
    assert_eq!(summary.raw_data, report);
    assert!(summary.error.is_none());
}

#[test]
fn published_json_carries_the_stable_schema() {
    let backend = cluster();
    let calculator = ImageUsageCalculator::new(&backend, credentials());

    let report = calculator
        .compute("pool-A", "csi-vol-1")
        .expect("compute succeeds");
    let summary = summarize(&report, "csi-vol-1", "pool-A");

    let value: serde_json::Value =
        serde_json::to_value(&summary).expect("summary serializes");

    assert_eq!(value["name"], "csi-vol-1");
    assert_eq!(value["pool"], "pool-A");
    assert_eq!(value["provisioned_size"], 10 * GIB);
    assert_eq!(value["used_size"], GIB);
    assert_eq!(value["raw_data"]["images"][0]["id"], "1234abcd");
    assert_eq!(value["raw_data"]["total_used_size"], GIB);
    assert!(value.get("error").is_none());
}

#[test]
fn unknown_pool_surfaces_as_pool_not_found() {
    let backend = cluster();
    let calculator = ImageUsageCalculator::new(&backend, credentials());

    let error = calculator
        .compute("pool-B", "csi-vol-1")
        .expect_err("compute fails");

    assert!(matches!(error, RbdError::PoolNotFound(_)));
}

#[test]
fn unknown_image_surfaces_as_image_not_found() {
    let backend = cluster();
    let calculator = ImageUsageCalculator::new(&backend, credentials());

    let error = calculator
        .compute("pool-A", "csi-vol-9")
        .expect_err("compute fails");

    assert!(matches!(error, RbdError::ImageNotFound(_)));
}
