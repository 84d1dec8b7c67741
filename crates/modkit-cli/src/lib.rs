//! Command line interface for the modkit module registry

pub mod commands;
pub mod common;
pub mod context;

pub use common::GlobalOpts;
pub use context::{CliContext, CliError};
