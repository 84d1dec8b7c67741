//! Build-spec descriptors
//!
//! A spec file describes an application module that may not exist on disk
//! yet. Specs are immutable snapshots: the registry replaces the whole set on
//! every refresh instead of mutating entries in place.

use serde::Serialize;

/// One discovered build spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecDescriptor {
    id: String,
    name: String,
    namespace: String,
    config_path: String,
    is_enabled: bool,
}

impl SpecDescriptor {
    pub fn new(id: &str, name: &str, namespace: &str, config_path: &str, is_enabled: bool) -> Self {
        SpecDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            namespace: namespace.to_string(),
            config_path: config_path.to_string(),
            is_enabled,
        }
    }

    /// Derived module id (`vendor/name`, lowercased)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name exactly as the spec file stated it
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Code namespace the generated module would live under
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Path of the spec file this descriptor was read from
    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }
}

impl std::fmt::Display for SpecDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}
