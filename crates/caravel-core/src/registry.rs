//! App registry and release store seams.

use crate::error::Result;
use async_trait::async_trait;
use caravel_manifest::Manifest;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared registry trait object.
pub type DynAppRegistry = Arc<dyn AppRegistry>;

/// Shared release store trait object.
pub type DynReleaseStore = Arc<dyn ReleaseStore>;

/// An app record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct App {
    /// App name.
    pub name: String,
    /// Whether the app is sleeping. A sleeping app's desired container set
    /// is empty.
    pub sleep: bool,
    /// Current release id.
    pub release: String,
}

/// Partial update to an app record. `None` fields are left untouched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AppUpdate {
    /// New sleep state.
    pub sleep: Option<bool>,
}

/// A release of an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Release {
    /// Release id. Stamped into container labels; a change here replaces
    /// every service container.
    pub id: String,
    /// Build id, used in service image tags.
    pub build: String,
}

/// The app registry surface the converger consumes.
#[async_trait]
pub trait AppRegistry: Send + Sync {
    /// Fetches an app record by name.
    async fn app_get(&self, name: &str) -> Result<App>;

    /// Applies a partial update to an app record.
    async fn app_update(&self, name: &str, update: AppUpdate) -> Result<()>;

    /// Lists all app records.
    async fn app_list(&self) -> Result<Vec<App>>;
}

/// Source of manifests and releases, keyed by app.
///
/// Manifest parsing and release storage live upstream; the converger only
/// asks for the current pair each tick.
#[async_trait]
pub trait ReleaseStore: Send + Sync {
    /// Returns the manifest and release currently promoted for the app.
    async fn manifest(&self, app: &str) -> Result<(Manifest, Release)>;
}
