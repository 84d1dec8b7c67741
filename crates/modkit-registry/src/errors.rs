use std::io;
use thiserror::Error;

/// Errors that can occur during registry and manifest operations
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Module [{0}] is not registered in the module manifest")]
    UnknownModule(String),

    #[error("Unable to create manifest directory {path}: {source}")]
    ManifestDir { path: String, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Error a host registrar reports for a single provider identifier
#[derive(Error, Debug)]
pub enum RegistrarError {
    #[error("Provider '{0}' is not known to the host")]
    UnknownProvider(String),

    #[error("Provider '{0}' failed to register: {1}")]
    Failed(String, String),
}
