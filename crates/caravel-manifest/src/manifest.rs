//! Manifest container type and lookups.

use crate::{Resource, Service};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One release's worth of app definition: services plus backing resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Services in declaration order.
    #[serde(default)]
    pub services: Vec<Service>,
    /// Resources in declaration order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Manifest {
    /// Looks up a service by name.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }

    /// Looks up a resource by name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }

    /// Resolves the effective environment for a named service.
    ///
    /// Returns a fresh map so callers can extend it (the converger injects
    /// resource URLs on top). `None` if the service does not exist.
    #[must_use]
    pub fn service_environment(&self, name: &str) -> Option<HashMap<String, String>> {
        self.service(name).map(|s| s.environment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        serde_json::from_str(
            r#"{
                "services": [
                    {"name": "api", "environment": {"LOG_LEVEL": "info"}},
                    {"name": "worker"}
                ],
                "resources": [
                    {"name": "db", "type": "postgres"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn service_lookup() {
        let m = manifest();
        assert!(m.service("api").is_some());
        assert!(m.service("missing").is_none());
        assert!(m.resource("db").is_some());
        assert!(m.resource("cache").is_none());
    }

    #[test]
    fn service_environment_is_a_copy() {
        let m = manifest();
        let mut env = m.service_environment("api").unwrap();
        env.insert("EXTRA".into(), "1".into());
        // The manifest itself is untouched.
        assert_eq!(m.service("api").unwrap().environment.len(), 1);
        assert!(m.service_environment("missing").is_none());
    }
}
