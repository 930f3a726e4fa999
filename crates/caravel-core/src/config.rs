//! Converger configuration.

use serde::{Deserialize, Serialize};

/// Default idle threshold: an hour without router activity puts an app to
/// sleep.
pub const DEFAULT_IDLE_AFTER_SECS: u64 = 3600;

/// Default cadence for the background converge sweep.
pub const DEFAULT_CONVERGE_INTERVAL_SECS: u64 = 10;

/// Default cadence for the background idle sweep.
pub const DEFAULT_IDLE_INTERVAL_SECS: u64 = 60;

/// Converger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergerConfig {
    /// Rack name. Appears in every container label and image tag.
    pub rack: String,
    /// Converger version string, stamped into container labels.
    pub version: String,
    /// Host directory under which app and resource volumes live.
    pub volume_root: String,
    /// Seconds of router inactivity after which an app is put to sleep.
    pub idle_after_secs: u64,
    /// Seconds between background converge sweeps.
    pub converge_interval_secs: u64,
    /// Seconds between background idle sweeps.
    pub idle_interval_secs: u64,
}

impl Default for ConvergerConfig {
    fn default() -> Self {
        Self {
            rack: "local".to_string(),
            version: "dev".to_string(),
            volume_root: "/var/lib/caravel".to_string(),
            idle_after_secs: DEFAULT_IDLE_AFTER_SECS,
            converge_interval_secs: DEFAULT_CONVERGE_INTERVAL_SECS,
            idle_interval_secs: DEFAULT_IDLE_INTERVAL_SECS,
        }
    }
}

impl ConvergerConfig {
    /// Creates a config for the given rack with defaults for everything
    /// else.
    #[must_use]
    pub fn for_rack(rack: impl Into<String>) -> Self {
        Self {
            rack: rack.into(),
            ..Self::default()
        }
    }
}
