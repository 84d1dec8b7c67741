//! The module registry
//!
//! [`ModuleRegistry`] owns the authoritative module set. It boots from the
//! persisted manifest when one exists and falls back to a full refresh
//! otherwise. Lifecycle changes go through the registry so that every
//! mutation lands in the manifest immediately and provider registration
//! stays consistent with module state.

use crate::descriptor::ModuleDescriptor;
use crate::discovery::ModuleDiscovery;
use crate::errors::RegistryError;
use crate::manifest::ManifestStore;
use crate::registrar::Registrar;
use crate::spec::SpecDescriptor;
use modkit_config::RegistryConfig;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

pub struct ModuleRegistry {
    config: RegistryConfig,
    discovery: ModuleDiscovery,
    store: ManifestStore,
    registrar: Box<dyn Registrar>,
    modules: BTreeMap<String, ModuleDescriptor>,
    specs: Vec<SpecDescriptor>,
    registered_providers: HashSet<String>,
    loaded_from_cache: bool,
}

impl ModuleRegistry {
    /// Open a registry.
    ///
    /// When the manifest holds at least one usable record the registry boots
    /// from it without touching the discovery sources; otherwise a full
    /// refresh runs and writes a fresh manifest.
    pub fn open(
        config: RegistryConfig,
        discovery: ModuleDiscovery,
        store: ManifestStore,
        registrar: Box<dyn Registrar>,
    ) -> Result<Self, RegistryError> {
        let mut registry = ModuleRegistry {
            config,
            discovery,
            store,
            registrar,
            modules: BTreeMap::new(),
            specs: Vec::new(),
            registered_providers: HashSet::new(),
            loaded_from_cache: false,
        };

        let cached = registry.cached_modules();
        if cached.is_empty() {
            registry.refresh(true)?;
        } else {
            debug!("Registry booted from manifest with {} module(s)", cached.len());
            registry.modules = cached;
            registry.loaded_from_cache = true;
        }
        Ok(registry)
    }

    fn cached_modules(&self) -> BTreeMap<String, ModuleDescriptor> {
        let mut modules = BTreeMap::new();
        for record in self.store.load() {
            let module = ModuleDescriptor::from_record(record);
            modules.insert(module.id().to_string(), module);
        }
        modules
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Whether the current state came from the manifest rather than a refresh
    pub fn loaded_from_cache(&self) -> bool {
        self.loaded_from_cache
    }

    /// Whether a manifest file currently exists on disk
    pub fn is_cached(&self) -> bool {
        self.store.exists()
    }

    /// All modules, keyed and sorted by id
    pub fn all(&self) -> &BTreeMap<String, ModuleDescriptor> {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn has(&self, id: &str) -> bool {
        self.modules.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Result<&ModuleDescriptor, RegistryError> {
        self.modules
            .get(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))
    }

    pub fn installed(&self) -> Vec<&ModuleDescriptor> {
        self.modules
            .values()
            .filter(|module| module.is_installed())
            .collect()
    }

    pub fn enabled(&self) -> Vec<&ModuleDescriptor> {
        self.modules
            .values()
            .filter(|module| module.is_enabled())
            .collect()
    }

    /// Build specs collected during the last refresh, sorted by id
    pub fn specs(&self) -> &[SpecDescriptor] {
        &self.specs
    }

    /// Mark a module installed, enable it when auto-enable is on, persist,
    /// and hand its providers to the registrar.
    pub fn install(&mut self, id: &str) -> Result<(), RegistryError> {
        let auto_enable = self.config.auto_enable();
        let module = self
            .modules
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))?;
        module.mark_installed(true);
        if auto_enable {
            module.mark_enabled(true);
        }
        info!("Installed module {}", id);
        self.persist()?;
        self.register_module_providers(id);
        Ok(())
    }

    /// Mark a module uninstalled (which also disables it) and persist.
    pub fn uninstall(&mut self, id: &str) -> Result<(), RegistryError> {
        let module = self
            .modules
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))?;
        module.mark_installed(false);
        info!("Uninstalled module {}", id);
        self.persist()
    }

    /// Enable a module and persist. Enabling a module that is not installed
    /// leaves it disabled; install first (or use auto-enable).
    pub fn enable(&mut self, id: &str) -> Result<(), RegistryError> {
        let module = self
            .modules
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))?;
        module.mark_enabled(true);
        info!("Enabled module {}", id);
        self.persist()?;
        self.register_module_providers(id);
        Ok(())
    }

    /// Disable a module without uninstalling it, and persist.
    pub fn disable(&mut self, id: &str) -> Result<(), RegistryError> {
        let module = self
            .modules
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownModule(id.to_string()))?;
        module.mark_enabled(false);
        info!("Disabled module {}", id);
        self.persist()
    }

    /// Rebuild the module set from the discovery sources.
    ///
    /// Lifecycle flags survive a refresh: the in-memory state wins, manifest
    /// records fill in ids memory does not know, and only modules seen for
    /// the first time get the configured defaults. Modules that no longer
    /// appear in any source are dropped. The spec list is always replaced.
    pub fn refresh(&mut self, write_manifest: bool) -> Result<(), RegistryError> {
        let mut overrides: BTreeMap<String, (bool, bool)> = BTreeMap::new();
        for (id, module) in &self.modules {
            overrides.insert(id.clone(), (module.is_installed(), module.is_enabled()));
        }
        for record in self.store.load() {
            if overrides.contains_key(&record.id) {
                continue;
            }
            let installed = record.installed.unwrap_or(self.config.auto_install());
            let enabled = record.enabled.unwrap_or(self.config.auto_enable());
            overrides.insert(record.id.clone(), (installed, enabled));
        }

        let mut discovered = self.discovery.discover();
        for (id, module) in &mut discovered {
            if let Some((installed, enabled)) = overrides.get(id) {
                module.mark_installed(*installed);
                module.mark_enabled(*enabled);
            }
        }
        self.modules = discovered;

        let mut specs = self.discovery.discover_specs();
        specs.sort_by(|a, b| a.id().cmp(b.id()));
        self.specs = specs;

        if write_manifest {
            self.persist()?;
        }
        info!(
            "Refreshed registry: {} module(s), {} spec(s)",
            self.modules.len(),
            self.specs.len()
        );
        Ok(())
    }

    /// Write the current module set to the manifest.
    pub fn persist(&self) -> Result<(), RegistryError> {
        self.store.write(&self.modules)
    }

    /// Forget all modules and specs and delete the manifest.
    pub fn clear(&mut self) -> Result<(), RegistryError> {
        self.modules.clear();
        self.specs.clear();
        self.loaded_from_cache = false;
        self.store.delete()
    }

    /// Hand the providers of every enabled module to the registrar.
    pub fn register_enabled(&mut self) {
        let ids: Vec<String> = self
            .modules
            .values()
            .filter(|module| module.is_enabled())
            .map(|module| module.id().to_string())
            .collect();
        for id in ids {
            self.register_module_providers(&id);
        }
    }

    /// Register one module's providers, skipping ones already registered.
    /// A provider the registrar rejects is logged and skipped; the others
    /// still go through, and the rejected one stays eligible for a retry.
    fn register_module_providers(&mut self, id: &str) {
        let Some(module) = self.modules.get(id) else {
            return;
        };
        if !module.is_enabled() {
            return;
        }
        let providers: Vec<String> = module.providers().to_vec();

        for provider in providers {
            if provider.is_empty() || self.registered_providers.contains(&provider) {
                continue;
            }
            match self.registrar.register(&provider) {
                Ok(()) => {
                    debug!("Registered provider {} for module {}", provider, id);
                    self.registered_providers.insert(provider);
                }
                Err(err) => {
                    warn!("Skipping provider for module {}: {}", id, err);
                }
            }
        }
    }
}
