//! Module discovery
//!
//! Two readers feed the registry. [`PackageMetadataReader`] walks the package
//! manager's installed-packages metadata and picks out packages that declare
//! themselves modules. [`LooseMetadataReader`] scans the filesystem for
//! standalone `module.json` files using the configured glob patterns.
//! [`ModuleDiscovery`] merges both into one deterministic set, with package
//! metadata winning id collisions, and also collects build-spec files.

use crate::descriptor::{ModuleDescriptor, PathValue};
use crate::spec::SpecDescriptor;
use modkit_config::paths::{absolute_path, canonicalize, parent_dir};
use modkit_config::RegistryConfig;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR, MAIN_SEPARATOR_STR};
use tracing::{debug, info, warn};

/// Package `type` value that marks a package as a module even when it carries
/// no module metadata block.
pub const MODULE_PACKAGE_TYPE: &str = "module";

/// Metadata keys that feed the `paths` mapping of a descriptor
const PATH_KEYS: &[&str] = &["routes", "migrations", "seeds", "views", "translations"];

type JsonObject = serde_json::Map<String, Value>;

// -----------------------------------------------------------------------------
// Package metadata
// -----------------------------------------------------------------------------

/// Reads modules out of the package manager's installed-packages file.
#[derive(Debug, Clone)]
pub struct PackageMetadataReader {
    config: RegistryConfig,
}

impl PackageMetadataReader {
    pub fn new(config: RegistryConfig) -> Self {
        PackageMetadataReader { config }
    }

    /// All packages that qualify as modules, in file order.
    pub fn read(&self) -> Vec<ModuleDescriptor> {
        let packages = self.installed_packages();
        let mut modules = Vec::new();
        for package in &packages {
            if let Some(module) = self.module_from_package(package) {
                modules.push(module);
            }
        }
        debug!(
            "Found {} module(s) among {} installed package(s)",
            modules.len(),
            packages.len()
        );
        modules
    }

    /// Parse the installed-packages file into a flat list of package records.
    ///
    /// Accepts the enveloped form (`{"packages": [...]}`), a bare list, and a
    /// single package object; nested envelopes inside a list are flattened.
    /// A missing or unparseable file yields no packages.
    fn installed_packages(&self) -> Vec<JsonObject> {
        let path = Path::new(self.config.installed_path());
        if !path.is_file() {
            debug!("No package metadata file at {}", path.display());
            return Vec::new();
        }
        let Ok(content) = fs::read_to_string(path) else {
            warn!("Unreadable package metadata at {}", path.display());
            return Vec::new();
        };
        let Ok(value) = serde_json::from_str::<Value>(&content) else {
            warn!("Malformed package metadata at {}", path.display());
            return Vec::new();
        };

        let candidates: Vec<Value> = match value {
            Value::Object(map) => {
                if let Some(Value::Array(list)) = map.get("packages") {
                    list.clone()
                } else if map.contains_key("name") {
                    vec![Value::Object(map)]
                } else {
                    map.into_iter().map(|(_, entry)| entry).collect()
                }
            }
            Value::Array(list) => list,
            _ => {
                warn!(
                    "Package metadata at {} is not a map or list",
                    path.display()
                );
                return Vec::new();
            }
        };

        let mut packages = Vec::new();
        for candidate in candidates {
            let Value::Object(record) = candidate else {
                continue;
            };
            if let Some(Value::Array(nested)) = record.get("packages") {
                for item in nested {
                    if let Value::Object(package) = item {
                        packages.push(package.clone());
                    }
                }
                continue;
            }
            packages.push(record);
        }
        packages
    }

    /// Turn one package record into a descriptor, or `None` when the package
    /// is not a module (neither the module type nor a metadata block) or has
    /// no usable id.
    fn module_from_package(&self, package: &JsonObject) -> Option<ModuleDescriptor> {
        let meta = match nested_lookup(package, self.config.package_meta_key()) {
            Some(Value::Object(map)) => map.clone(),
            _ => JsonObject::new(),
        };

        let package_type = package.get("type").and_then(Value::as_str).unwrap_or("");
        if package_type != MODULE_PACKAGE_TYPE && meta.is_empty() {
            return None;
        }

        let id_value = match meta.get("id") {
            None | Some(Value::Null) => package.get("name"),
            declared => declared,
        };
        let id = match id_value {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                debug!("Skipping module package without a usable id");
                return None;
            }
        };

        let name = meta
            .get("name")
            .and_then(Value::as_str)
            .or_else(|| package.get("name").and_then(Value::as_str))
            .unwrap_or(&id);
        let version = meta
            .get("version")
            .and_then(Value::as_str)
            .or_else(|| package.get("version").and_then(Value::as_str))
            .or_else(|| package.get("pretty_version").and_then(Value::as_str))
            .unwrap_or("0.0.0");

        let base_path = self.resolve_install_path(package);
        let providers =
            normalize_providers(nested_lookup(package, self.config.package_providers_key()));
        let capabilities = normalize_string_list(meta.get("capabilities"));
        let paths = normalize_paths(&meta);

        Some(
            ModuleDescriptor::new(
                &id,
                name,
                version,
                self.config.auto_install(),
                self.config.auto_enable(),
                &base_path,
            )
            .with_paths(paths)
            .with_providers(providers)
            .with_capabilities(capabilities)
            .with_extra(meta),
        )
    }

    /// Where the package lives on disk.
    ///
    /// An `install_path` hint resolves against the directory that holds the
    /// metadata file; without one the conventional `vendor/<name>` location
    /// is assumed, and a nameless package falls back to the base path.
    fn resolve_install_path(&self, package: &JsonObject) -> String {
        let hint = package
            .get("install_path")
            .and_then(Value::as_str)
            .or_else(|| package.get("install-path").and_then(Value::as_str))
            .unwrap_or("");
        if !hint.is_empty() {
            let metadata_dir = parent_dir(self.config.installed_path());
            let candidate = absolute_path(metadata_dir, hint);
            if !candidate.is_empty() {
                return candidate;
            }
        }

        let name = package.get("name").and_then(Value::as_str).unwrap_or("");
        if !name.is_empty() {
            return self
                .config
                .absolute_path(&format!("vendor{}{}", MAIN_SEPARATOR, name));
        }
        self.config.base_path().to_string()
    }
}

// -----------------------------------------------------------------------------
// Loose module files
// -----------------------------------------------------------------------------

/// Reads standalone `module.json` files matched by the configured patterns.
#[derive(Debug, Clone)]
pub struct LooseMetadataReader {
    config: RegistryConfig,
}

impl LooseMetadataReader {
    pub fn new(config: RegistryConfig) -> Self {
        LooseMetadataReader { config }
    }

    /// All parseable module files, each file contributing at most one module.
    pub fn read(&self) -> Vec<ModuleDescriptor> {
        let mut files: Vec<PathBuf> = Vec::new();
        for pattern in self.config.module_json_patterns() {
            let absolute = self.config.absolute_path(pattern);
            files.extend(glob_files(&absolute));
        }
        files.sort();
        files.dedup();
        debug!("Found {} loose module file(s)", files.len());

        let mut modules = Vec::new();
        for file in &files {
            if let Some(module) = self.module_from_file(file) {
                modules.push(module);
            }
        }
        modules
    }

    fn module_from_file(&self, file: &Path) -> Option<ModuleDescriptor> {
        let content = match fs::read_to_string(file) {
            Ok(content) => content,
            Err(err) => {
                warn!("Skipping unreadable module file {}: {}", file.display(), err);
                return None;
            }
        };
        let value = match serde_json::from_str::<Value>(&content) {
            Ok(value) => value,
            Err(err) => {
                warn!("Skipping invalid module file {}: {}", file.display(), err);
                return None;
            }
        };
        let Value::Object(record) = value else {
            warn!(
                "Skipping module file {}: not a JSON object",
                file.display()
            );
            return None;
        };

        let id = match record.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => {
                warn!("Skipping module file {}: missing id", file.display());
                return None;
            }
        };
        let name = record.get("name").and_then(Value::as_str).unwrap_or(&id);
        let version = record
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("0.0.0");

        // The module's tree is wherever its module.json sits
        let parent = file.parent().unwrap_or(Path::new(""));
        let base_path = canonicalize(&parent.to_string_lossy());

        let paths = normalize_paths(&record);
        let providers = normalize_providers(record.get("providers"));
        let capabilities = normalize_string_list(record.get("capabilities"));

        Some(
            ModuleDescriptor::new(
                &id,
                name,
                version,
                self.config.auto_install(),
                self.config.auto_enable(),
                &base_path,
            )
            .with_paths(paths)
            .with_providers(providers)
            .with_capabilities(capabilities)
            .with_extra(record),
        )
    }
}

// -----------------------------------------------------------------------------
// Combined discovery
// -----------------------------------------------------------------------------

/// Merges both metadata sources and collects build specs.
#[derive(Debug, Clone)]
pub struct ModuleDiscovery {
    package: PackageMetadataReader,
    loose: LooseMetadataReader,
    config: RegistryConfig,
}

impl ModuleDiscovery {
    pub fn new(
        package: PackageMetadataReader,
        loose: LooseMetadataReader,
        config: RegistryConfig,
    ) -> Self {
        ModuleDiscovery {
            package,
            loose,
            config,
        }
    }

    /// Wire up both readers against the same configuration.
    pub fn from_config(config: &RegistryConfig) -> Self {
        ModuleDiscovery::new(
            PackageMetadataReader::new(config.clone()),
            LooseMetadataReader::new(config.clone()),
            config.clone(),
        )
    }

    /// Run both readers and merge the results, keyed and sorted by module id.
    ///
    /// Package metadata is authoritative: a loose module file with the same
    /// id as a discovered package is ignored.
    pub fn discover(&self) -> BTreeMap<String, ModuleDescriptor> {
        let mut modules: BTreeMap<String, ModuleDescriptor> = BTreeMap::new();
        for module in self.package.read() {
            modules.insert(module.id().to_string(), module);
        }
        for module in self.loose.read() {
            if modules.contains_key(module.id()) {
                debug!(
                    "Keeping package metadata for {} over a loose module file",
                    module.id()
                );
                continue;
            }
            modules.insert(module.id().to_string(), module);
        }
        info!("Discovered {} module(s)", modules.len());
        modules
    }

    /// Scan the specs directory for `*.json` build specs, in file order.
    ///
    /// Files that are unreadable, missing required fields, or marked disabled
    /// are skipped with a warning. One bad file never aborts the scan.
    pub fn discover_specs(&self) -> Vec<SpecDescriptor> {
        let dir = PathBuf::from(self.config.specs_path());
        let Ok(entries) = fs::read_dir(&dir) else {
            debug!("No spec directory at {}", dir.display());
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut specs = Vec::new();
        for file in &files {
            if let Some(spec) = self.spec_from_file(file) {
                specs.push(spec);
            }
        }
        debug!("Collected {} build spec(s)", specs.len());
        specs
    }

    fn spec_from_file(&self, file: &Path) -> Option<SpecDescriptor> {
        let Ok(content) = fs::read_to_string(file) else {
            warn!("Skipping unreadable spec file {}", file.display());
            return None;
        };
        let Ok(value) = serde_json::from_str::<Value>(&content) else {
            warn!("Skipping invalid spec file {}", file.display());
            return None;
        };

        let app = match value.get("app") {
            Some(Value::Object(app)) => {
                if app.get("disabled").and_then(Value::as_bool) == Some(true) {
                    warn!("Skipping disabled spec file {}", file.display());
                    return None;
                }
                app
            }
            _ => {
                warn!("Skipping spec file {}: no app section", file.display());
                return None;
            }
        };

        let name = match app.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name,
            _ => {
                warn!("Skipping spec file {}: app has no name", file.display());
                return None;
            }
        };

        let vendor = match app.get("vendor") {
            Some(Value::String(vendor)) => vendor.clone(),
            None | Some(Value::Null) => self
                .config
                .default_vendor()
                .unwrap_or_default()
                .to_string(),
            Some(_) => String::new(),
        };
        if vendor.is_empty() {
            warn!(
                "Skipping spec file {}: no vendor given and no default vendor configured",
                file.display()
            );
            return None;
        }

        let short = name.rsplit('/').find(|s| !s.is_empty()).unwrap_or(name);
        let id = format!("{}/{}", vendor.to_lowercase(), short.to_lowercase());
        let namespace = format!("{}.{}", vendor, studly_case(short));

        Some(SpecDescriptor::new(
            &id,
            name,
            &namespace,
            &file.to_string_lossy(),
            true,
        ))
    }
}

// -----------------------------------------------------------------------------
// Metadata shaping helpers
// -----------------------------------------------------------------------------

/// Walk a dotted key (`extra.module`) through nested JSON objects.
fn nested_lookup<'a>(record: &'a JsonObject, key_path: &str) -> Option<&'a Value> {
    let mut segments = key_path.split('.');
    let mut current = record.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Pick the known path keys out of a metadata block.
///
/// A list keeps its shape even when empty; a non-empty string becomes a
/// single entry; anything else is dropped.
fn normalize_paths(source: &JsonObject) -> BTreeMap<String, PathValue> {
    let mut paths = BTreeMap::new();
    for key in PATH_KEYS {
        let Some(value) = source.get(*key) else {
            continue;
        };
        match value {
            Value::Array(items) => {
                let entries: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(ToString::to_string)
                    .collect();
                paths.insert((*key).to_string(), PathValue::Many(entries));
            }
            Value::String(path) if !path.is_empty() => {
                paths.insert((*key).to_string(), PathValue::One(path.clone()));
            }
            _ => {}
        }
    }
    paths
}

/// Keep only non-empty strings out of a JSON list.
fn normalize_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Providers may be declared as a single string or a list of strings.
fn normalize_providers(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(provider)) if !provider.is_empty() => vec![provider.clone()],
        Some(Value::Array(_)) => normalize_string_list(value),
        _ => Vec::new(),
    }
}

/// Collapse `-`, `_` and spaces and capitalize each part: `admin-panel`
/// becomes `AdminPanel`.
fn studly_case(value: &str) -> String {
    value
        .split(['-', '_', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Globbing
// -----------------------------------------------------------------------------

/// Expand a glob pattern where `*` matches within one path segment.
/// Returns matching files sorted by path.
fn glob_files(pattern: &str) -> Vec<PathBuf> {
    let normalized = canonicalize(pattern);
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut rest = normalized.as_str();
    let mut root = PathBuf::from(".");
    if let Some(stripped) = rest.strip_prefix(MAIN_SEPARATOR) {
        root = PathBuf::from(MAIN_SEPARATOR_STR);
        rest = stripped;
    } else if let Some((first, stripped)) = rest.split_once(MAIN_SEPARATOR) {
        if first.contains(':') {
            root = PathBuf::from(format!("{}{}", first, MAIN_SEPARATOR));
            rest = stripped;
        }
    }

    let segments: Vec<&str> = rest
        .split(MAIN_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    collect_glob_matches(&root, &segments, &mut matches);
    matches.sort();
    matches
}

fn collect_glob_matches(root: &Path, segments: &[&str], out: &mut Vec<PathBuf>) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };
    let is_last = rest.is_empty();

    if !segment.contains('*') {
        let next = root.join(segment);
        if is_last {
            if next.is_file() {
                out.push(next);
            }
        } else if next.is_dir() {
            collect_glob_matches(&next, rest, out);
        }
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };
    for entry in entries.flatten() {
        let file_name = entry.file_name().to_string_lossy().to_string();
        // Wildcards never match hidden entries, matching shell glob behavior
        if file_name.starts_with('.') && !segment.starts_with('.') {
            continue;
        }
        if !segment_matches(segment, &file_name) {
            continue;
        }
        let path = entry.path();
        if is_last {
            if path.is_file() {
                out.push(path);
            }
        } else if path.is_dir() {
            collect_glob_matches(&path, rest, out);
        }
    }
}

/// Match one glob segment against one file name, `*` matching any run of
/// characters including none.
fn segment_matches(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let first = parts[0];
    let last = parts[parts.len() - 1];

    let Some(without_prefix) = name.strip_prefix(first) else {
        return false;
    };
    let Some(mut middle) = without_prefix.strip_suffix(last) else {
        return false;
    };

    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        let Some(idx) = middle.find(part) else {
            return false;
        };
        middle = &middle[idx + part.len()..];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use modkit_config::RegistrySettings;
    use tempfile::TempDir;

    const INSTALLED_JSON: &str = r#"{
        "packages": [
            {
                "name": "acme/blog",
                "type": "module",
                "version": "1.2.3",
                "install_path": "../blog",
                "extra": {
                    "providers": ["Acme.Blog.Provider"],
                    "module": {
                        "id": "acme/blog",
                        "name": "Blog",
                        "routes": "routes/api.json",
                        "migrations": ["migrations", "legacy/migrations"],
                        "capabilities": ["api", "admin"]
                    }
                }
            },
            {
                "name": "acme/utils",
                "type": "library",
                "version": "2.0.0"
            }
        ]
    }"#;

    fn write_file(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            let created = fs::create_dir_all(parent);
            assert!(created.is_ok(), "failed to create {}", parent.display());
        }
        let written = fs::write(path, content);
        assert!(written.is_ok(), "failed to write {}", path.display());
    }

    fn sandbox_config(temp: &TempDir) -> RegistryConfig {
        RegistryConfig::with_base(&temp.path().to_string_lossy())
    }

    #[test]
    fn test_package_reader_reads_module_packages() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(Path::new(config.installed_path()), INSTALLED_JSON);

        let modules = PackageMetadataReader::new(config.clone()).read();
        assert_eq!(modules.len(), 1, "the library package must be skipped");

        let module = &modules[0];
        assert_eq!(module.id(), "acme/blog");
        assert_eq!(module.name(), "Blog");
        assert_eq!(module.version(), "1.2.3");
        assert!(module.is_installed());
        assert!(module.is_enabled());
        assert_eq!(module.base_path(), config.absolute_path("blog"));
        assert_eq!(module.providers(), ["Acme.Blog.Provider"]);
        assert_eq!(module.capabilities(), ["api", "admin"]);
        assert_eq!(
            module.paths().get("routes"),
            Some(&PathValue::One("routes/api.json".to_string()))
        );
        assert_eq!(
            module.paths().get("migrations"),
            Some(&PathValue::Many(vec![
                "migrations".to_string(),
                "legacy/migrations".to_string()
            ]))
        );
    }

    #[test]
    fn test_package_reader_missing_file_yields_nothing() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let modules = PackageMetadataReader::new(sandbox_config(&temp)).read();
        assert!(modules.is_empty());
    }

    #[test]
    fn test_package_reader_accepts_single_record_shape() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            Path::new(config.installed_path()),
            r#"{"name": "acme/solo", "type": "module", "version": "0.9.0"}"#,
        );

        let modules = PackageMetadataReader::new(config.clone()).read();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id(), "acme/solo");
        assert_eq!(
            modules[0].base_path(),
            config.absolute_path("vendor/acme/solo"),
            "without an install path the vendor convention applies"
        );
    }

    #[test]
    fn test_package_reader_flattens_nested_envelopes() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            Path::new(config.installed_path()),
            r#"[
                {"name": "acme/one", "type": "module"},
                {"packages": [{"name": "acme/two", "type": "module"}]}
            ]"#,
        );

        let modules = PackageMetadataReader::new(config).read();
        let ids: Vec<&str> = modules.iter().map(ModuleDescriptor::id).collect();
        assert_eq!(ids, ["acme/one", "acme/two"]);
    }

    #[test]
    fn test_package_reader_meta_marks_module_without_type() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            Path::new(config.installed_path()),
            r#"{"packages": [
                {"name": "acme/typed-out", "extra": {"module": {"id": "acme/meta-only", "version": "3.1.4"}}}
            ]}"#,
        );

        let modules = PackageMetadataReader::new(config).read();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].id(), "acme/meta-only");
        assert_eq!(modules[0].version(), "3.1.4");
    }

    #[test]
    fn test_package_reader_skips_package_without_id() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            Path::new(config.installed_path()),
            r#"{"packages": [{"type": "module", "version": "1.0.0"}]}"#,
        );

        assert!(PackageMetadataReader::new(config).read().is_empty());
    }

    #[test]
    fn test_loose_reader_discovers_module_files() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            &temp.path().join("modules").join("custom").join("module.json"),
            r#"{"id": "acme/custom", "name": "Custom", "providers": "Acme.Custom.Provider", "views": "resources/views"}"#,
        );

        let modules = LooseMetadataReader::new(config.clone()).read();
        assert_eq!(modules.len(), 1);

        let module = &modules[0];
        assert_eq!(module.id(), "acme/custom");
        assert_eq!(module.name(), "Custom");
        assert_eq!(module.version(), "0.0.0");
        assert_eq!(module.base_path(), config.absolute_path("modules/custom"));
        assert_eq!(module.providers(), ["Acme.Custom.Provider"]);
        assert!(module.extra().contains_key("views"));
    }

    #[test]
    fn test_loose_reader_skips_files_without_id() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            &temp.path().join("modules").join("a").join("module.json"),
            r#"{"name": "No id here"}"#,
        );
        write_file(
            &temp.path().join("modules").join("b").join("module.json"),
            r#"{"id": ""}"#,
        );
        write_file(
            &temp.path().join("modules").join("c").join("module.json"),
            "[1, 2, 3]",
        );

        assert!(LooseMetadataReader::new(config).read().is_empty());
    }

    #[test]
    fn test_discover_package_wins_id_collisions() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(Path::new(config.installed_path()), INSTALLED_JSON);
        write_file(
            &temp.path().join("modules").join("blog").join("module.json"),
            r#"{"id": "acme/blog", "name": "Shadowed Blog"}"#,
        );
        write_file(
            &temp.path().join("modules").join("extra").join("module.json"),
            r#"{"id": "acme/extra", "name": "Extra"}"#,
        );

        let modules = ModuleDiscovery::from_config(&config).discover();
        let ids: Vec<&String> = modules.keys().collect();
        assert_eq!(ids, ["acme/blog", "acme/extra"]);

        let blog = modules.get("acme/blog");
        assert!(blog.is_some_and(|m| m.name() == "Blog"), "package metadata must win");
    }

    #[test]
    fn test_discover_honors_auto_flags() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let settings = RegistrySettings {
            base_path: Some(temp.path().to_string_lossy().to_string()),
            auto_enable: Some(false),
            ..Default::default()
        };
        let config = RegistryConfig::resolve(&settings);
        assert!(config.is_ok(), "resolve should succeed with an explicit base");
        let Ok(config) = config else {
            return;
        };
        write_file(Path::new(config.installed_path()), INSTALLED_JSON);

        let modules = ModuleDiscovery::from_config(&config).discover();
        let blog = modules.get("acme/blog");
        assert!(blog.is_some_and(|m| m.is_installed() && !m.is_enabled()));
    }

    #[test]
    fn test_discover_specs_reads_and_derives_identity() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        let specs_dir = PathBuf::from(config.specs_path());
        write_file(
            &specs_dir.join("admin.json"),
            r#"{"app": {"name": "Acme/admin-panel", "vendor": "Acme"}}"#,
        );
        write_file(
            &specs_dir.join("shop.json"),
            r#"{"app": {"name": "shop", "vendor": "Acme"}}"#,
        );
        write_file(&specs_dir.join("notes.txt"), "not a spec");

        let specs = ModuleDiscovery::from_config(&config).discover_specs();
        assert_eq!(specs.len(), 2);

        assert_eq!(specs[0].id(), "acme/admin-panel");
        assert_eq!(specs[0].name(), "Acme/admin-panel");
        assert_eq!(specs[0].namespace(), "Acme.AdminPanel");
        assert!(specs[0].config_path().ends_with("admin.json"));
        assert!(specs[0].is_enabled());

        assert_eq!(specs[1].id(), "acme/shop");
        assert_eq!(specs[1].namespace(), "Acme.Shop");
    }

    #[test]
    fn test_discover_specs_skips_disabled_and_invalid() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        let specs_dir = PathBuf::from(config.specs_path());
        write_file(
            &specs_dir.join("disabled.json"),
            r#"{"app": {"name": "Gone", "vendor": "Acme", "disabled": true}}"#,
        );
        write_file(&specs_dir.join("no-app.json"), r#"{"modules": []}"#);
        write_file(
            &specs_dir.join("no-name.json"),
            r#"{"app": {"vendor": "Acme"}}"#,
        );
        write_file(&specs_dir.join("broken.json"), "{");
        write_file(
            &specs_dir.join("ok.json"),
            r#"{"app": {"name": "Keeper", "vendor": "Acme"}}"#,
        );

        let specs = ModuleDiscovery::from_config(&config).discover_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id(), "acme/keeper");
    }

    #[test]
    fn test_discover_specs_vendor_fallback() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let base = temp.path().to_string_lossy().to_string();

        // No vendor in the file and no default configured: the spec is skipped
        let bare = RegistryConfig::with_base(&base);
        write_file(
            &PathBuf::from(bare.specs_path()).join("app.json"),
            r#"{"app": {"name": "Billing"}}"#,
        );
        assert!(ModuleDiscovery::from_config(&bare).discover_specs().is_empty());

        // With a default vendor the same file resolves
        let settings = RegistrySettings {
            base_path: Some(base),
            default_vendor: Some("Glugox".to_string()),
            ..Default::default()
        };
        let config = RegistryConfig::resolve(&settings);
        assert!(config.is_ok(), "resolve should succeed with an explicit base");
        let Ok(config) = config else {
            return;
        };
        let specs = ModuleDiscovery::from_config(&config).discover_specs();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id(), "glugox/billing");
        assert_eq!(specs[0].namespace(), "Glugox.Billing");
    }

    #[test]
    fn test_glob_files_walks_wildcard_segments() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        write_file(
            &temp.path().join("vendor/acme/blog/module.json"),
            r#"{"id": "acme/blog"}"#,
        );
        write_file(
            &temp.path().join("vendor/acme/shop/module.json"),
            r#"{"id": "acme/shop"}"#,
        );
        write_file(&temp.path().join("vendor/acme/blog/readme.md"), "docs");
        write_file(
            &temp.path().join("vendor/.hidden/x/module.json"),
            r#"{"id": "acme/hidden"}"#,
        );

        let pattern = config.absolute_path("vendor/*/*/module.json");
        let files = glob_files(&pattern);
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("blog/module.json"));
        assert!(files[1].ends_with("shop/module.json"));
    }

    #[test]
    fn test_glob_files_literal_pattern_matches_one_file() {
        let Ok(temp) = TempDir::new() else {
            return;
        };
        let config = sandbox_config(&temp);
        let file = temp.path().join("modules/custom/module.json");
        write_file(&file, r#"{"id": "acme/custom"}"#);

        let files = glob_files(&config.absolute_path("modules/custom/module.json"));
        assert_eq!(files.len(), 1);

        // A directory where a file is expected does not match
        assert!(glob_files(&config.absolute_path("modules/custom")).is_empty());
    }

    #[test]
    fn test_segment_matches() {
        assert!(segment_matches("module.json", "module.json"));
        assert!(!segment_matches("module.json", "module.json5"));
        assert!(segment_matches("*", "anything"));
        assert!(segment_matches("*.json", "module.json"));
        assert!(!segment_matches("*.json", "module.jsonx"));
        assert!(segment_matches("mod*", "module"));
        assert!(segment_matches("*mod*json*", "xx-mod-yy.json"));
        assert!(!segment_matches("a*a", "a"));
    }

    #[test]
    fn test_nested_lookup_walks_dotted_keys() {
        let parsed: Result<Value, _> =
            serde_json::from_str(r#"{"extra": {"module": {"id": "acme/blog"}}, "flat": 1}"#);
        assert!(parsed.is_ok());
        let Ok(Value::Object(record)) = parsed else {
            return;
        };

        assert_eq!(
            nested_lookup(&record, "extra.module.id").and_then(Value::as_str),
            Some("acme/blog")
        );
        assert!(nested_lookup(&record, "extra.missing").is_none());
        assert!(nested_lookup(&record, "flat.too.deep").is_none());
        assert_eq!(
            nested_lookup(&record, "flat").and_then(Value::as_i64),
            Some(1)
        );
    }

    #[test]
    fn test_studly_case() {
        assert_eq!(studly_case("admin-panel"), "AdminPanel");
        assert_eq!(studly_case("admin_panel"), "AdminPanel");
        assert_eq!(studly_case("hello world"), "HelloWorld");
        assert_eq!(studly_case("Shop"), "Shop");
        assert_eq!(studly_case(""), "");
    }
}
