// SPDX-License-Identifier: GPL-3.0-only

//! Cluster connection credentials
//!
//! Credentials are an explicit parameter to the core: missing required
//! fields are a hard [`RbdError::Configuration`], never silently replaced
//! by a built-in endpoint or secret.

use std::fmt;

use crate::error::{RbdError, Result};

pub const ENV_MON_HOST: &str = "CEPH_MON_HOST";
pub const ENV_KEY: &str = "CEPH_KEY";
pub const ENV_CLIENT_NAME: &str = "CEPH_CLIENT_NAME";

pub const DEFAULT_CLIENT_NAME: &str = "client.admin";

/// Immutable connection parameters for one cluster
#[derive(Clone, PartialEq, Eq)]
pub struct ClusterCredentials {
    /// Ordered monitor endpoints as `host:port` entries
    pub mon_hosts: Vec<String>,

    /// Authentication secret
    pub key: String,

    /// Identity presented to the cluster's access-control layer
    pub client_name: String,
}

impl ClusterCredentials {
    pub fn new(
        mon_hosts: Vec<String>,
        key: impl Into<String>,
        client_name: impl Into<String>,
    ) -> Result<Self> {
        let credentials = Self {
            mon_hosts,
            key: key.into(),
            client_name: client_name.into(),
        };
        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from the process environment
    ///
    /// Reads `CEPH_MON_HOST` (required, comma-separated `host:port` list),
    /// `CEPH_KEY` (required) and `CEPH_CLIENT_NAME` (optional, defaults to
    /// `client.admin`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load credentials through an injected variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mon_host = lookup(ENV_MON_HOST).unwrap_or_default();
        let mon_hosts: Vec<String> = mon_host
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();

        let key = lookup(ENV_KEY).unwrap_or_default();
        let client_name = lookup(ENV_CLIENT_NAME)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());

        Self::new(mon_hosts, key, client_name)
    }

    /// Check that every required field is present
    ///
    /// Runs before any network attempt so a misconfigured process fails
    /// fast with a configuration error rather than a connection error.
    pub fn validate(&self) -> Result<()> {
        if self.mon_hosts.is_empty() {
            return Err(RbdError::Configuration(format!(
                "monitor endpoint list is empty ({ENV_MON_HOST})"
            )));
        }
        if self.key.is_empty() {
            return Err(RbdError::Configuration(format!(
                "authentication key is empty ({ENV_KEY})"
            )));
        }
        if self.client_name.is_empty() {
            return Err(RbdError::Configuration(format!(
                "client name is empty ({ENV_CLIENT_NAME})"
            )));
        }
        Ok(())
    }

    /// Monitor list joined back into the wire option format
    pub fn mon_host(&self) -> String {
        self.mon_hosts.join(",")
    }
}

impl fmt::Debug for ClusterCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCredentials")
            .field("mon_hosts", &self.mon_hosts)
            .field("key", &"<redacted>")
            .field("client_name", &self.client_name)
            .finish()
    }
}
