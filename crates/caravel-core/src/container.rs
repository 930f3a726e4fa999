//! Container model and the label-identity diff.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label keys under which a container carries its identity.
///
/// The full labels map is the container's identity for diffing, so these
/// keys are part of the external contract with the runtime.
pub mod labels {
    /// Rack the container belongs to.
    pub const RACK: &str = "caravel.rack";
    /// Converger version that created the container.
    pub const VERSION: &str = "caravel.version";
    /// App the container belongs to.
    pub const APP: &str = "caravel.app";
    /// Release the container was created for.
    pub const RELEASE: &str = "caravel.release";
    /// Container kind, `service` or `resource`.
    pub const TYPE: &str = "caravel.type";
    /// Service or resource name.
    pub const NAME: &str = "caravel.name";
    /// Container hostname.
    pub const HOSTNAME: &str = "caravel.hostname";
    /// Service name (service containers only).
    pub const SERVICE: &str = "caravel.service";
    /// Instance index, 1-based (service containers only).
    pub const INDEX: &str = "caravel.index";
    /// Routed port (service containers only).
    pub const PORT: &str = "caravel.port";
    /// Backend scheme (service containers only).
    pub const SCHEME: &str = "caravel.scheme";
    /// Resource type (resource containers only).
    pub const RESOURCE: &str = "caravel.resource";
}

/// A container, either a desired specification or a runtime observation.
///
/// Desired specs are built fresh each convergence tick; observations come
/// back from the runtime's `list`. The `id` and `listeners` fields are only
/// populated on observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Runtime id; empty on desired specs.
    #[serde(default)]
    pub id: String,
    /// Container name.
    pub name: String,
    /// Container hostname.
    pub hostname: String,
    /// Image reference.
    pub image: String,
    /// Command; empty means the image default.
    #[serde(default)]
    pub command: Vec<String>,
    /// Environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Memory in MiB.
    #[serde(default)]
    pub memory: u64,
    /// Volume bindings, `host:container`.
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Primary container port; 0 if none.
    #[serde(default)]
    pub port: u16,
    /// Identity labels.
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Published listeners, container port to `host:port`; observations
    /// only.
    #[serde(default)]
    pub listeners: HashMap<u16, String>,
}

/// Returns the containers of `a` that do not appear in `b`.
///
/// Two containers are the same iff their labels maps are equal. A release
/// or scale change alters a label, so replacements fall out of the diff
/// without consulting image digests or runtime ids. Input order is
/// preserved.
#[must_use]
pub fn diff(a: &[Container], b: &[Container]) -> Vec<Container> {
    a.iter()
        .filter(|aa| !b.iter().any(|bb| aa.labels == bb.labels))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(name: &str, release: &str, index: &str) -> Container {
        let mut labels = HashMap::new();
        labels.insert(labels::RACK.to_string(), "local".to_string());
        labels.insert(labels::APP.to_string(), "web".to_string());
        labels.insert(labels::NAME.to_string(), name.to_string());
        labels.insert(labels::RELEASE.to_string(), release.to_string());
        labels.insert(labels::INDEX.to_string(), index.to_string());
        Container {
            name: format!("local.web.service.{name}.{index}"),
            labels,
            ..Container::default()
        }
    }

    #[test]
    fn diff_of_equal_sets_is_empty() {
        let xs = vec![container("api", "R1", "1"), container("api", "R1", "2")];
        assert!(diff(&xs, &xs).is_empty());
    }

    #[test]
    fn diff_against_empty_is_identity() {
        let xs = vec![container("api", "R1", "1")];
        assert_eq!(diff(&xs, &[]), xs);
        assert!(diff(&[], &xs).is_empty());
    }

    #[test]
    fn release_change_replaces_everything() {
        let old = vec![container("api", "R1", "1"), container("api", "R1", "2")];
        let new = vec![container("api", "R2", "1"), container("api", "R2", "2")];
        assert_eq!(diff(&old, &new).len(), 2);
        assert_eq!(diff(&new, &old).len(), 2);
    }

    #[test]
    fn scale_down_stops_highest_index() {
        let current = vec![container("api", "R1", "1"), container("api", "R1", "2")];
        let desired = vec![container("api", "R1", "1")];
        let extra = diff(&current, &desired);
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].labels[labels::INDEX], "2");
        assert!(diff(&desired, &current).is_empty());
    }

    #[test]
    fn identity_ignores_non_label_fields() {
        let mut observed = container("api", "R1", "1");
        observed.id = "abc123".to_string();
        observed.listeners.insert(5000, "127.0.0.1:30001".to_string());
        let spec = container("api", "R1", "1");
        assert!(diff(&[observed], &[spec]).is_empty());
    }
}
