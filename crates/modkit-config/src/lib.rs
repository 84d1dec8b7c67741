//! Configuration for the modkit module registry
//!
//! Two layers are involved: [`RegistrySettings`] is the raw shape of a
//! `modkit.toml` file where every field is optional, and [`RegistryConfig`]
//! is the resolved form consumed by the registry, with defaults applied and
//! every location turned into a canonical path rooted at the base directory.

pub mod paths;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default manifest location, relative to the base path
pub const DEFAULT_MANIFEST_PATH: &str = "cache/modules.json";
/// Default package-manager metadata file, relative to the base path
pub const DEFAULT_INSTALLED_PATH: &str = "vendor/installed.json";
/// Default directory that holds loose module trees
pub const DEFAULT_MODULES_PATH: &str = "modules";
/// Default directory scanned for build-spec files
pub const DEFAULT_SPECS_PATH: &str = "specs/modules";
/// Default dotted key under a package record that holds module metadata
pub const DEFAULT_PACKAGE_META_KEY: &str = "extra.module";
/// Default dotted key under a package record that lists provider identifiers
pub const DEFAULT_PACKAGE_PROVIDERS_KEY: &str = "extra.providers";

const DEFAULT_MODULE_JSON_PATTERNS: &[&str] = &[
    "vendor/*/*/module.json",
    "modules/*/module.json",
    "packages/*/*/module.json",
];

/// Error type for settings loading and config resolution
#[derive(Debug)]
pub enum ConfigError {
    /// No base path was configured and the working directory is unavailable
    BasePath(String),
    /// Failed to read or write the settings file
    Io(std::io::Error),
    /// The settings file is not valid TOML
    Parse(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::BasePath(msg) => {
                write!(f, "Could not determine a base path: {}", msg)
            }
            ConfigError::Io(err) => write!(f, "Settings file error: {}", err),
            ConfigError::Parse(msg) => write!(f, "Invalid settings file: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Raw settings as they appear in `modkit.toml`. Every field is optional;
/// [`RegistryConfig::resolve`] fills in the defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RegistrySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_json_paths: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specs_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_install: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_meta_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_providers_key: Option<String>,
}

impl RegistrySettings {
    /// Locate the settings file for a run rooted at `base`.
    ///
    /// Honors an explicit override via `MODKIT_CONFIG` for tests and isolated
    /// runs, then a project-local `modkit.toml` inside the base directory,
    /// then the per-user config file.
    pub fn locate(base: Option<&str>) -> PathBuf {
        if let Ok(env_path) = std::env::var("MODKIT_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        let local = Path::new(base.unwrap_or(".")).join("modkit.toml");
        if local.exists() {
            return local;
        }

        match Self::user_config_path() {
            Some(user) if user.exists() => user,
            _ => local,
        }
    }

    /// Per-user settings file path (platform-appropriate), if a home
    /// directory can be determined.
    pub fn user_config_path() -> Option<PathBuf> {
        #[cfg(not(target_os = "windows"))]
        {
            dirs::home_dir().map(|h| h.join(".config").join("modkit").join("modkit.toml"))
        }

        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|c| c.join("modkit").join("modkit.toml"))
        }
    }

    /// Load settings from a specific path, returning defaults if the file
    /// does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(RegistrySettings::default());
        }
        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save settings to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, content).map_err(ConfigError::Io)
    }
}

/// Resolved registry configuration.
///
/// All paths are canonical (see [`paths::canonicalize`]) and rooted at the
/// base path; the glob patterns stay relative and are resolved at discovery
/// time so that absolute patterns in settings pass through untouched.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    base_path: String,
    modules_path: String,
    manifest_path: String,
    installed_path: String,
    module_json_patterns: Vec<String>,
    specs_path: String,
    default_vendor: Option<String>,
    auto_install: bool,
    auto_enable: bool,
    package_meta_key: String,
    package_providers_key: String,
}

impl RegistryConfig {
    /// Resolve raw settings into a usable configuration.
    ///
    /// Falls back to the current working directory when no base path is
    /// configured; failing to determine one is the only fatal outcome here.
    pub fn resolve(settings: &RegistrySettings) -> Result<Self, ConfigError> {
        let base_path = match settings.base_path.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => paths::canonicalize(base),
            _ => {
                let cwd = std::env::current_dir()
                    .map_err(|e| ConfigError::BasePath(e.to_string()))?;
                paths::canonicalize(&cwd.to_string_lossy())
            }
        };
        Ok(Self::from_parts(base_path, settings))
    }

    /// Build a configuration rooted at `base` with everything else defaulted.
    pub fn with_base(base: &str) -> Self {
        Self::from_parts(paths::canonicalize(base), &RegistrySettings::default())
    }

    fn from_parts(base_path: String, settings: &RegistrySettings) -> Self {
        let modules_path = paths::absolute_path(
            &base_path,
            settings.modules_path.as_deref().unwrap_or(DEFAULT_MODULES_PATH),
        );
        let manifest_path = paths::absolute_path(
            &base_path,
            settings.manifest_path.as_deref().unwrap_or(DEFAULT_MANIFEST_PATH),
        );
        let installed_path = paths::absolute_path(
            &base_path,
            settings.installed_path.as_deref().unwrap_or(DEFAULT_INSTALLED_PATH),
        );
        let specs_path = paths::absolute_path(
            &base_path,
            settings.specs_path.as_deref().unwrap_or(DEFAULT_SPECS_PATH),
        );

        RegistryConfig {
            modules_path,
            manifest_path,
            installed_path,
            specs_path,
            module_json_patterns: normalize_patterns(settings.module_json_paths.as_deref()),
            default_vendor: settings.default_vendor.clone(),
            auto_install: settings.auto_install.unwrap_or(true),
            auto_enable: settings.auto_enable.unwrap_or(true),
            package_meta_key: settings
                .package_meta_key
                .clone()
                .unwrap_or_else(|| DEFAULT_PACKAGE_META_KEY.to_string()),
            package_providers_key: settings
                .package_providers_key
                .clone()
                .unwrap_or_else(|| DEFAULT_PACKAGE_PROVIDERS_KEY.to_string()),
            base_path,
        }
    }

    /// Canonical base path every relative location is rooted at
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Directory that holds loose module trees
    pub fn modules_path(&self) -> &str {
        &self.modules_path
    }

    /// Where the module manifest is persisted
    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }

    /// Package-manager metadata file consumed by discovery
    pub fn installed_path(&self) -> &str {
        &self.installed_path
    }

    /// Glob patterns for loose `module.json` files, relative to the base path
    pub fn module_json_patterns(&self) -> &[String] {
        &self.module_json_patterns
    }

    /// Directory scanned for build-spec files
    pub fn specs_path(&self) -> &str {
        &self.specs_path
    }

    /// Vendor assumed for spec files that name no vendor of their own
    pub fn default_vendor(&self) -> Option<&str> {
        self.default_vendor.as_deref()
    }

    /// Whether discovered modules default to installed during refresh
    pub fn auto_install(&self) -> bool {
        self.auto_install
    }

    /// Whether installing a module also enables it
    pub fn auto_enable(&self) -> bool {
        self.auto_enable
    }

    /// Dotted key under a package record that holds module metadata
    pub fn package_meta_key(&self) -> &str {
        &self.package_meta_key
    }

    /// Dotted key under a package record that lists provider identifiers
    pub fn package_providers_key(&self) -> &str {
        &self.package_providers_key
    }

    /// Resolve a path against the base path (see [`paths::absolute_path`])
    pub fn absolute_path(&self, path: &str) -> String {
        paths::absolute_path(&self.base_path, path)
    }
}

fn normalize_patterns(patterns: Option<&[String]>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    if let Some(values) = patterns {
        for value in values {
            let trimmed = value.trim();
            if !trimmed.is_empty() && !out.iter().any(|p| p == trimmed) {
                out.push(trimmed.to_string());
            }
        }
    }
    if out.is_empty() {
        out = DEFAULT_MODULE_JSON_PATTERNS
            .iter()
            .map(|p| (*p).to_string())
            .collect();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_applies_defaults_under_base() {
        let settings = RegistrySettings {
            base_path: Some("/srv/app".to_string()),
            ..Default::default()
        };
        let config = RegistryConfig::resolve(&settings);
        assert!(config.is_ok(), "resolve should succeed with an explicit base");
        let Ok(config) = config else {
            return;
        };

        assert_eq!(config.base_path(), "/srv/app");
        assert_eq!(config.manifest_path(), "/srv/app/cache/modules.json");
        assert_eq!(config.installed_path(), "/srv/app/vendor/installed.json");
        assert_eq!(config.modules_path(), "/srv/app/modules");
        assert_eq!(config.specs_path(), "/srv/app/specs/modules");
        assert!(config.auto_install());
        assert!(config.auto_enable());
        assert_eq!(config.package_meta_key(), "extra.module");
        assert_eq!(config.package_providers_key(), "extra.providers");
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_honors_overrides() {
        let settings = RegistrySettings {
            base_path: Some("/srv/app".to_string()),
            manifest_path: Some("state/manifest.json".to_string()),
            installed_path: Some("/opt/packages/installed.json".to_string()),
            auto_enable: Some(false),
            default_vendor: Some("acme".to_string()),
            ..Default::default()
        };
        let config = RegistryConfig::resolve(&settings);
        assert!(config.is_ok(), "resolve should succeed with an explicit base");
        let Ok(config) = config else {
            return;
        };

        assert_eq!(config.manifest_path(), "/srv/app/state/manifest.json");
        assert_eq!(config.installed_path(), "/opt/packages/installed.json");
        assert!(!config.auto_enable());
        assert_eq!(config.default_vendor(), Some("acme"));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_canonicalizes_base() {
        let settings = RegistrySettings {
            base_path: Some("/srv/app/./sub/..".to_string()),
            ..Default::default()
        };
        let config = RegistryConfig::resolve(&settings);
        assert!(config.is_ok(), "resolve should succeed with an explicit base");
        let Ok(config) = config else {
            return;
        };
        assert_eq!(config.base_path(), "/srv/app");
    }

    #[test]
    fn test_patterns_default_when_unset_or_blank() {
        let defaulted = normalize_patterns(None);
        assert_eq!(defaulted.len(), 3);
        assert_eq!(defaulted[0], "vendor/*/*/module.json");

        let blank = normalize_patterns(Some(&["   ".to_string(), String::new()]));
        assert_eq!(blank, defaulted);
    }

    #[test]
    fn test_patterns_trim_and_dedupe_preserving_order() {
        let patterns = normalize_patterns(Some(&[
            " modules/*/module.json ".to_string(),
            "addons/*/module.json".to_string(),
            "modules/*/module.json".to_string(),
        ]));
        assert_eq!(
            patterns,
            vec!["modules/*/module.json", "addons/*/module.json"]
        );
    }

    #[test]
    fn test_settings_load_missing_file_is_default() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let result = RegistrySettings::load_from_path(&temp.path().join("modkit.toml"));
        assert!(result.is_ok_and(|s| s.base_path.is_none() && s.auto_install.is_none()));
    }

    #[test]
    fn test_settings_roundtrip() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let path = temp.path().join("nested").join("modkit.toml");

        let settings = RegistrySettings {
            base_path: Some("/srv/app".to_string()),
            auto_enable: Some(false),
            module_json_paths: Some(vec!["addons/*/module.json".to_string()]),
            ..Default::default()
        };
        assert!(settings.save_to_path(&path).is_ok());

        let loaded = RegistrySettings::load_from_path(&path);
        assert!(loaded.is_ok_and(|s| {
            s.base_path.as_deref() == Some("/srv/app")
                && s.auto_enable == Some(false)
                && s.module_json_paths
                    .as_deref()
                    .is_some_and(|p| p == ["addons/*/module.json"])
        }));
    }

    #[test]
    fn test_settings_reject_invalid_toml() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let path = temp.path().join("modkit.toml");
        let Ok(()) = fs::write(&path, "base_path = [not toml") else {
            return;
        };
        assert!(matches!(
            RegistrySettings::load_from_path(&path),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_locate_prefers_project_local_file() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let local = temp.path().join("modkit.toml");
        let Ok(()) = fs::write(&local, "") else {
            return;
        };

        let base = temp.path().to_string_lossy().to_string();
        assert_eq!(RegistrySettings::locate(Some(&base)), local);
    }
}
