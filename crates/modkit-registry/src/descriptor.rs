//! Module descriptor types
//!
//! A [`ModuleDescriptor`] is the in-memory unit the registry tracks: identity,
//! lifecycle flags, filesystem location, and the metadata read from whichever
//! source discovered it. [`ModuleRecord`] is the tolerant wire form used when
//! reading descriptors back from a persisted manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, MAIN_SEPARATOR};

// =============================================================================
// PATH VALUE - string-or-list payload for the paths sub-mapping
// =============================================================================

/// Value of one entry in a module's `paths` mapping.
///
/// Metadata files may give a single location (`"routes/api.json"`) or an
/// ordered list; both shapes are preserved through persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathValue {
    One(String),
    Many(Vec<String>),
}

impl PathValue {
    /// View the entries as a list regardless of the underlying shape
    pub fn as_list(&self) -> Vec<&str> {
        match self {
            PathValue::One(path) => vec![path.as_str()],
            PathValue::Many(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

// =============================================================================
// HEALTH - read-only lifecycle evaluation
// =============================================================================

/// Health of a module, evaluated on demand and never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    NotInstalled,
    MissingFiles,
    Disabled,
    Healthy,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::NotInstalled => "not installed",
            HealthStatus::MissingFiles => "missing files",
            HealthStatus::Disabled => "disabled",
            HealthStatus::Healthy => "healthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// MODULE RECORD - tolerant wire form for manifest load
// =============================================================================

/// One persisted manifest entry as read back from disk.
///
/// Everything except the id is optional so that hand-edited or older manifests
/// still load; [`ModuleDescriptor::from_record`] applies the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub installed: Option<bool>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathValue>,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// MODULE DESCRIPTOR - the unit of registry state
// =============================================================================

/// A module known to the registry.
///
/// Lifecycle flags are only reachable through the marker methods, which
/// maintain the one invariant of this type: a module is never enabled while
/// it is not installed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    id: String,
    name: String,
    version: String,
    installed: bool,
    enabled: bool,
    base_path: String,
    paths: BTreeMap<String, PathValue>,
    providers: Vec<String>,
    capabilities: Vec<String>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl ModuleDescriptor {
    /// Create a descriptor with empty metadata collections.
    ///
    /// An `enabled` flag passed for a module that is not installed is
    /// silently dropped rather than rejected.
    pub fn new(
        id: &str,
        name: &str,
        version: &str,
        installed: bool,
        enabled: bool,
        base_path: &str,
    ) -> Self {
        ModuleDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            installed,
            enabled: enabled && installed,
            base_path: base_path.to_string(),
            paths: BTreeMap::new(),
            providers: Vec::new(),
            capabilities: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Rehydrate a descriptor from a persisted record.
    ///
    /// A record missing its lifecycle flags re-materializes as installed,
    /// and enabled only if installed.
    pub fn from_record(record: ModuleRecord) -> Self {
        let installed = record.installed.unwrap_or(true);
        let enabled = record.enabled.unwrap_or(installed);
        ModuleDescriptor {
            name: record.name.unwrap_or_else(|| record.id.clone()),
            version: record.version.unwrap_or_else(|| "0.0.0".to_string()),
            installed,
            enabled: enabled && installed,
            base_path: record.base_path.unwrap_or_default(),
            paths: record.paths,
            providers: record.providers,
            capabilities: record.capabilities,
            extra: record.extra,
            id: record.id,
        }
    }

    pub fn with_paths(mut self, paths: BTreeMap<String, PathValue>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_providers(mut self, providers: Vec<String>) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_extra(mut self, extra: serde_json::Map<String, serde_json::Value>) -> Self {
        self.extra = extra;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn paths(&self) -> &BTreeMap<String, PathValue> {
        &self.paths
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    /// Record the installed flag. Uninstalling also disables the module so
    /// the enabled-implies-installed invariant survives.
    pub fn mark_installed(&mut self, installed: bool) {
        self.installed = installed;
        if !installed {
            self.enabled = false;
        }
    }

    /// Record the enabled flag. Enabling a module that is not installed is
    /// silently collapsed back to disabled.
    pub fn mark_enabled(&mut self, enabled: bool) {
        self.enabled = enabled && self.installed;
    }

    /// Enable the module if it is installed; a no-op otherwise.
    pub fn enable(&mut self) {
        self.mark_enabled(true);
    }

    /// Disable the module without touching the installed flag.
    pub fn disable(&mut self) {
        self.mark_enabled(false);
    }

    /// Mark the module uninstalled, which also disables it.
    pub fn uninstall(&mut self) {
        self.mark_installed(false);
    }

    /// Whether the module's base path is present on disk. An empty base path
    /// cannot be checked and counts as present.
    pub fn base_path_exists(&self) -> bool {
        self.base_path.is_empty() || Path::new(&self.base_path).is_dir()
    }

    /// Join a relative location onto the module's base path. An empty
    /// argument returns the trimmed base path itself.
    pub fn path(&self, sub: &str) -> String {
        let base = self.base_path.trim_end_matches(['/', '\\']);
        if sub.is_empty() {
            return base.to_string();
        }
        format!(
            "{}{}{}",
            base,
            MAIN_SEPARATOR,
            sub.trim_start_matches(['/', '\\'])
        )
    }

    /// Evaluate module health: installed, then files present, then enabled.
    pub fn health(&self) -> HealthStatus {
        if !self.installed {
            return HealthStatus::NotInstalled;
        }
        if !self.base_path_exists() {
            return HealthStatus::MissingFiles;
        }
        if !self.enabled {
            return HealthStatus::Disabled;
        }
        HealthStatus::Healthy
    }

    pub fn is_healthy(&self) -> bool {
        self.health() == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_enabled_collapses_when_not_installed() {
        let module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", false, true, "");
        assert!(!module.is_installed());
        assert!(!module.is_enabled());
    }

    #[test]
    fn test_uninstall_disables() {
        let mut module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", true, true, "");
        assert!(module.is_enabled());

        module.mark_installed(false);
        assert!(!module.is_installed());
        assert!(!module.is_enabled());
    }

    #[test]
    fn test_mark_enabled_on_uninstalled_is_silent_noop() {
        let mut module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", false, false, "");
        module.mark_enabled(true);
        assert!(!module.is_enabled());
    }

    #[test]
    fn test_enable_does_not_imply_install() {
        let mut module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", false, false, "");
        module.enable();
        assert!(!module.is_installed());
        assert!(!module.is_enabled());

        module.mark_installed(true);
        module.enable();
        assert!(module.is_enabled());
    }

    #[test]
    fn test_reinstall_does_not_restore_enabled() {
        let mut module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", true, true, "");
        module.mark_installed(false);
        module.mark_installed(true);
        assert!(module.is_installed());
        assert!(!module.is_enabled(), "enabling must stay explicit");
    }

    #[test]
    fn test_from_record_defaults() {
        let record = ModuleRecord {
            id: "acme/blog".to_string(),
            name: None,
            version: None,
            installed: None,
            enabled: None,
            base_path: None,
            paths: BTreeMap::new(),
            providers: Vec::new(),
            capabilities: Vec::new(),
            extra: serde_json::Map::new(),
        };

        let module = ModuleDescriptor::from_record(record);
        assert_eq!(module.id(), "acme/blog");
        assert_eq!(module.name(), "acme/blog");
        assert_eq!(module.version(), "0.0.0");
        assert!(module.is_installed());
        assert!(module.is_enabled());
        assert_eq!(module.base_path(), "");
    }

    #[test]
    fn test_from_record_collapses_enabled_without_installed() {
        let record = ModuleRecord {
            id: "acme/blog".to_string(),
            name: Some("Blog".to_string()),
            version: Some("1.2.3".to_string()),
            installed: Some(false),
            enabled: Some(true),
            base_path: None,
            paths: BTreeMap::new(),
            providers: Vec::new(),
            capabilities: Vec::new(),
            extra: serde_json::Map::new(),
        };

        let module = ModuleDescriptor::from_record(record);
        assert!(!module.is_installed());
        assert!(!module.is_enabled());
    }

    #[test]
    fn test_path_joins_and_trims() {
        let module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", true, true, "/app/mods/");
        #[cfg(not(windows))]
        {
            assert_eq!(module.path(""), "/app/mods");
            assert_eq!(module.path("/routes/api.json"), "/app/mods/routes/api.json");
            assert_eq!(module.path("config"), "/app/mods/config");
        }
    }

    #[test]
    fn test_health_order() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let base = temp.path().to_string_lossy().to_string();

        let mut module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", false, false, &base);
        assert_eq!(module.health(), HealthStatus::NotInstalled);

        module.mark_installed(true);
        assert_eq!(module.health(), HealthStatus::Disabled);

        module.enable();
        assert_eq!(module.health(), HealthStatus::Healthy);
        assert!(module.is_healthy());

        let missing = temp.path().join("gone").to_string_lossy().to_string();
        let ghost = ModuleDescriptor::new("acme/ghost", "Ghost", "1.0.0", true, true, &missing);
        assert_eq!(ghost.health(), HealthStatus::MissingFiles);
    }

    #[test]
    fn test_empty_base_path_is_not_missing_files() {
        let module = ModuleDescriptor::new("acme/blog", "Blog", "1.0.0", true, true, "");
        assert_eq!(module.health(), HealthStatus::Healthy);
    }

    #[test]
    fn test_serialized_descriptor_loads_as_record() {
        let module = ModuleDescriptor::new("acme/blog", "Blog", "1.2.3", true, false, "/app/blog")
            .with_providers(vec!["Acme.Blog.Provider".to_string()])
            .with_capabilities(vec!["api".to_string()]);

        let Ok(value) = serde_json::to_value(&module) else {
            return;
        };
        let record: Result<ModuleRecord, _> = serde_json::from_value(value);
        assert!(record.is_ok(), "descriptor JSON should load as a record");

        let Ok(record) = record else {
            return;
        };
        let restored = ModuleDescriptor::from_record(record);
        assert_eq!(restored, module);
    }

    #[test]
    fn test_path_value_as_list() {
        let one = PathValue::One("routes/api.json".to_string());
        assert_eq!(one.as_list(), vec!["routes/api.json"]);

        let many = PathValue::Many(vec![
            "migrations/0001_init.sql".to_string(),
            "migrations/0002_indexes.sql".to_string(),
        ]);
        assert_eq!(
            many.as_list(),
            vec!["migrations/0001_init.sql", "migrations/0002_indexes.sql"]
        );
    }
}
