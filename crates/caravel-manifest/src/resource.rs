//! Resource definitions.

use serde::{Deserialize, Serialize};

/// A backing datastore instantiated per app.
///
/// The type is carried as an open string here; the converger resolves it
/// against the closed set of supported kinds and rejects anything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name, unique within the manifest.
    pub name: String,
    /// Resource type (`mysql`, `postgres`, `redis`).
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_type_field() {
        let r: Resource = serde_json::from_str(r#"{"name":"db","type":"postgres"}"#).unwrap();
        assert_eq!(r.name, "db");
        assert_eq!(r.kind, "postgres");
    }
}
