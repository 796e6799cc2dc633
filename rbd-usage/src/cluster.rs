// SPDX-License-Identifier: GPL-3.0-only

//! Cluster session lifecycle
//!
//! The backend seam is three object-safe traits: [`ClusterBackend`] creates
//! sessions, a [`ClusterSession`] holds an authenticated connection with one
//! open pool, and an [`ImageHandle`] exposes the per-image operations the
//! usage computation needs. [`ConnectionManager`] layers credential
//! validation and guarded release on top.
//!
//! Handle discipline: an image handle must be dropped before its session is
//! released, and a session is released exactly once — [`SessionGuard`] makes
//! the release idempotent and runs it from `Drop`, so every exit path of a
//! computation (success, early `?` return, panic unwind) reaches the
//! `Disconnected` state.

use tracing::debug;

use rbd_types::{ExtentRecord, ImageStat};

use crate::config::ClusterCredentials;
use crate::error::Result;

/// Factory for cluster sessions
///
/// A single `connect` call performs one session establishment plus one pool
/// open; no retry is attempted. Errors: [`crate::RbdError::Connection`] when
/// the cluster is unreachable, [`crate::RbdError::Authentication`] when the
/// credentials are rejected, [`crate::RbdError::PoolNotFound`] when the pool
/// does not exist.
pub trait ClusterBackend: Send + Sync {
    fn connect(
        &self,
        credentials: &ClusterCredentials,
        pool_name: &str,
    ) -> Result<Box<dyn ClusterSession>>;
}

/// An authenticated session scoped to one pool
pub trait ClusterSession {
    /// Open the named image read-only
    ///
    /// Fails with [`crate::RbdError::ImageNotFound`] when the image is
    /// absent from the pool.
    fn open_image(&mut self, image_name: &str) -> Result<Box<dyn ImageHandle + '_>>;

    /// Close the pool context and shut the session down
    ///
    /// Safe to call more than once; later calls are no-ops.
    fn disconnect(&mut self);
}

/// An open image within a session's pool
///
/// Dropping the handle closes the image.
pub trait ImageHandle {
    /// Metadata snapshot taken at open time
    fn stat(&self) -> Result<ImageStat>;

    /// Walk `[offset, offset + length)` delivering extent records in
    /// non-overlapping, increasing offset order
    fn diff_iterate(
        &self,
        offset: u64,
        length: u64,
        visit: &mut dyn FnMut(ExtentRecord),
    ) -> Result<()>;
}

/// Validates credentials and hands out release-guarded sessions
pub struct ConnectionManager<'a> {
    backend: &'a dyn ClusterBackend,
}

impl<'a> ConnectionManager<'a> {
    pub fn new(backend: &'a dyn ClusterBackend) -> Self {
        Self { backend }
    }

    /// Establish a session and open the named pool
    ///
    /// Credential validation happens first, so a misconfigured process
    /// fails before any network attempt is made.
    pub fn connect(
        &self,
        credentials: &ClusterCredentials,
        pool_name: &str,
    ) -> Result<SessionGuard> {
        credentials.validate()?;

        debug!(
            mon_host = %credentials.mon_host(),
            client = %credentials.client_name,
            pool = pool_name,
            "connecting to cluster"
        );
        let session = self.backend.connect(credentials, pool_name)?;
        Ok(SessionGuard {
            session: Some(session),
        })
    }
}

/// Owns a live session and guarantees its release
pub struct SessionGuard {
    session: Option<Box<dyn ClusterSession>>,
}

impl SessionGuard {
    pub fn open_image(&mut self, image_name: &str) -> Result<Box<dyn ImageHandle + '_>> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| crate::RbdError::Operation("session already released".into()))?;
        session.open_image(image_name)
    }

    /// Release the pool context and session
    ///
    /// Idempotent; also invoked from `Drop` so error paths cannot leak a
    /// dangling session on the cluster side.
    pub fn disconnect(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.disconnect();
            debug!("cluster session released");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.disconnect();
    }
}
