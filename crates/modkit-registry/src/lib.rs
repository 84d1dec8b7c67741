//! Module registry for modkit
//!
//! Discovers application modules from package-manager metadata and loose
//! `module.json` files, reconciles them with persisted lifecycle state, and
//! keeps a JSON manifest as the boot cache. Host applications plug in a
//! [`Registrar`] to receive provider identifiers for enabled modules.
//!
//! The usual entry point is [`ModuleRegistry::open`]:
//!
//! ```no_run
//! use modkit_config::RegistryConfig;
//! use modkit_registry::{ManifestStore, ModuleDiscovery, ModuleRegistry, NullRegistrar};
//!
//! # fn main() -> Result<(), modkit_registry::RegistryError> {
//! let config = RegistryConfig::with_base("/srv/app");
//! let registry = ModuleRegistry::open(
//!     config.clone(),
//!     ModuleDiscovery::from_config(&config),
//!     ManifestStore::new(config.manifest_path()),
//!     Box::new(NullRegistrar),
//! )?;
//! for module in registry.enabled() {
//!     println!("{} {}", module.id(), module.version());
//! }
//! # Ok(())
//! # }
//! ```

pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod manifest;
pub mod registrar;
pub mod registry;
pub mod spec;

pub use descriptor::{HealthStatus, ModuleDescriptor, ModuleRecord, PathValue};
pub use discovery::{
    LooseMetadataReader, ModuleDiscovery, PackageMetadataReader, MODULE_PACKAGE_TYPE,
};
pub use errors::{RegistrarError, RegistryError};
pub use manifest::ManifestStore;
pub use registrar::{NullRegistrar, Registrar, TracingRegistrar};
pub use registry::ModuleRegistry;
pub use spec::SpecDescriptor;
