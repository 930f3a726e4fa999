//! Router seam and record types.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared router trait object.
pub type DynRouter = Arc<dyn Router>;

/// A rack as the router sees it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RackInfo {
    /// Hosts registered under the rack.
    pub hosts: Vec<HostInfo>,
}

/// A registered router host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    /// DNS-like host name, `{service}.{app}`.
    pub hostname: String,
    /// Time of the last request the router forwarded for this host.
    pub activity: DateTime<Utc>,
}

/// A `(host, port)` listener and its forwarding targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Endpoint {
    /// Frontend protocol, `http` or `https`.
    pub proto: String,
    /// Frontend port.
    pub port: u16,
    /// Backend target URLs.
    pub targets: Vec<String>,
}

/// The router's CRUD surface as the converger consumes it.
#[async_trait]
pub trait Router: Send + Sync {
    /// Returns the rack with its hosts and their activity times.
    async fn rack_get(&self, rack: &str) -> Result<RackInfo>;

    /// Registers a host under the rack. Re-creating an existing host is a
    /// no-op.
    async fn host_create(&self, rack: &str, host: &str) -> Result<()>;

    /// Looks up the endpoint at `(host, port)`. A not found error signals
    /// the caller to create it.
    async fn endpoint_get(&self, rack: &str, host: &str, port: u16) -> Result<Endpoint>;

    /// Creates the endpoint at `(host, port)` with the given frontend
    /// protocol.
    async fn endpoint_create(
        &self,
        rack: &str,
        host: &str,
        proto: &str,
        port: u16,
    ) -> Result<Endpoint>;

    /// Adds a forwarding target to an endpoint.
    async fn target_add(&self, rack: &str, host: &str, port: u16, target: &str) -> Result<()>;

    /// Removes a forwarding target from an endpoint.
    async fn target_remove(&self, rack: &str, host: &str, port: u16, target: &str) -> Result<()>;
}
