//! Shared command context
//!
//! Every command goes through the same setup: locate and load the settings
//! file, resolve it into a [`RegistryConfig`], and open the registry. The
//! `--base` flag outranks any base path found in the settings file.

use crate::GlobalOpts;
use modkit_config::paths;
use modkit_config::{ConfigError, RegistryConfig, RegistrySettings};
use modkit_registry::{
    ManifestStore, ModuleDiscovery, ModuleRegistry, RegistryError, TracingRegistrar,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Registry(#[from] RegistryError),
}

pub struct CliContext {
    config: RegistryConfig,
    registry: ModuleRegistry,
}

impl CliContext {
    /// Resolve settings and open the registry for one command invocation.
    pub fn load(opts: &GlobalOpts) -> Result<Self, CliError> {
        let settings_path = RegistrySettings::locate(opts.base.as_deref());
        let mut settings = RegistrySettings::load_from_path(&settings_path)?;

        if let Some(base) = opts.base.as_deref() {
            let trimmed = base.trim();
            if !trimmed.is_empty() {
                settings.base_path = Some(absolutize_base(trimmed));
            }
        }

        let config = RegistryConfig::resolve(&settings)?;
        let registry = ModuleRegistry::open(
            config.clone(),
            ModuleDiscovery::from_config(&config),
            ManifestStore::new(config.manifest_path()),
            Box::new(TracingRegistrar),
        )?;

        Ok(CliContext { config, registry })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.registry
    }
}

/// Anchor a `--base` value to the working directory so the registry never
/// depends on where the process later chdirs to.
fn absolutize_base(base: &str) -> String {
    if paths::is_absolute(base) {
        return paths::canonicalize(base);
    }
    match std::env::current_dir() {
        Ok(cwd) => paths::absolute_path(&cwd.to_string_lossy(), base),
        Err(_) => base.to_string(),
    }
}
