//! Command implementations

pub mod clean;
pub mod doctor;
pub mod init;
pub mod lifecycle;
pub mod list;
pub mod reload;
pub mod specs;
