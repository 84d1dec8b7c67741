//! Host integration seam
//!
//! The registry does not know what a provider *is*; it only tracks provider
//! identifiers declared by modules and hands them to a [`Registrar`] when a
//! module becomes active. Host applications implement the trait to wire
//! providers into their own runtime.

use crate::errors::RegistrarError;
use tracing::info;

/// Receives provider identifiers for enabled modules.
///
/// The registry deduplicates identifiers for the lifetime of a registry
/// instance, so an implementation sees each provider at most once per run.
/// Returning an error skips that provider and is reported as a warning; it
/// never aborts the surrounding operation.
pub trait Registrar {
    fn register(&mut self, provider: &str) -> Result<(), RegistrarError>;
}

/// Accepts every provider and does nothing.
///
/// For hosts that resolve providers lazily and only need the registry for
/// module state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRegistrar;

impl Registrar for NullRegistrar {
    fn register(&mut self, _provider: &str) -> Result<(), RegistrarError> {
        Ok(())
    }
}

/// Logs each provider activation.
///
/// Used by the command line tools, where no host runtime is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRegistrar;

impl Registrar for TracingRegistrar {
    fn register(&mut self, provider: &str) -> Result<(), RegistrarError> {
        info!("Activated provider {}", provider);
        Ok(())
    }
}
