//! Container runtime seam.

use crate::container::Container;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

/// Shared runtime trait object.
pub type DynContainerRuntime = Arc<dyn ContainerRuntime>;

/// The slice of a container runtime the converger consumes.
///
/// This trait abstracts the host's container engine, allowing different
/// implementations (a real docker driver, in-memory for testing).
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists live containers whose labels are a superset of `selector`.
    async fn list(&self, selector: &HashMap<String, String>) -> Result<Vec<Container>>;

    /// Starts a container from `spec` for the given app and release,
    /// returning the runtime id.
    async fn start(&self, spec: &Container, app: &str, release: &str) -> Result<String>;

    /// Stops (and discards) a container by runtime id.
    async fn stop(&self, id: &str) -> Result<()>;
}
