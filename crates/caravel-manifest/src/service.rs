//! Service definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A long-running, possibly-scaled workload from the manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Service {
    /// Service name, unique within the manifest.
    pub name: String,
    /// Shell command; empty means the image default.
    #[serde(default)]
    pub command: String,
    /// Declared environment variables.
    #[serde(default)]
    pub environment: HashMap<String, String>,
    /// Scale (instance count and per-instance memory).
    #[serde(default)]
    pub scale: Scale,
    /// Names of manifest resources this service uses.
    #[serde(default)]
    pub resources: Vec<String>,
    /// Volume bindings (`host:container` or a bare container path).
    #[serde(default)]
    pub volumes: Vec<String>,
    /// Routed port; 0 means the service is not routed.
    #[serde(default)]
    pub port: ServicePort,
}

/// Service scale settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scale {
    /// Instance count range.
    #[serde(default)]
    pub count: CountRange,
    /// Memory per instance in MiB.
    #[serde(default = "default_memory")]
    pub memory: u64,
}

impl Default for Scale {
    fn default() -> Self {
        Self {
            count: CountRange::default(),
            memory: default_memory(),
        }
    }
}

const fn default_memory() -> u64 {
    256
}

/// Instance count range.
///
/// Only `min` drives convergence today; `max` is carried for autoscaling
/// layers above the converger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CountRange {
    /// Minimum (and currently effective) instance count.
    pub min: i32,
    /// Optional maximum instance count.
    #[serde(default)]
    pub max: Option<i32>,
}

impl Default for CountRange {
    fn default() -> Self {
        Self { min: 1, max: None }
    }
}

/// A service's routed port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePort {
    /// Container port receiving routed traffic; 0 = not routed.
    #[serde(default)]
    pub port: u16,
    /// Backend scheme, `http` or `https`.
    #[serde(default = "default_scheme")]
    pub scheme: String,
}

impl Default for ServicePort {
    fn default() -> Self {
        Self {
            port: 0,
            scheme: default_scheme(),
        }
    }
}

fn default_scheme() -> String {
    "http".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s: Service = serde_json::from_str(r#"{"name":"api"}"#).unwrap();
        assert_eq!(s.name, "api");
        assert_eq!(s.command, "");
        assert_eq!(s.scale.count.min, 1);
        assert_eq!(s.scale.count.max, None);
        assert_eq!(s.scale.memory, 256);
        assert_eq!(s.port.port, 0);
        assert_eq!(s.port.scheme, "http");
        assert!(s.resources.is_empty());
    }

    #[test]
    fn full_service() {
        let s: Service = serde_json::from_str(
            r#"{
                "name": "api",
                "command": "bin/web",
                "environment": {"FOO": "bar"},
                "scale": {"count": {"min": 2, "max": 4}, "memory": 512},
                "resources": ["db"],
                "port": {"port": 5000, "scheme": "https"}
            }"#,
        )
        .unwrap();
        assert_eq!(s.command, "bin/web");
        assert_eq!(s.environment["FOO"], "bar");
        assert_eq!(s.scale.count.min, 2);
        assert_eq!(s.scale.count.max, Some(4));
        assert_eq!(s.scale.memory, 512);
        assert_eq!(s.resources, vec!["db"]);
        assert_eq!(s.port.port, 5000);
        assert_eq!(s.port.scheme, "https");
    }
}
