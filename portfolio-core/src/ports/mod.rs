//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. Services depend
//! only on these traits, not on concrete implementations.

mod backup_api;
mod command;
mod container_source;

pub use backup_api::BackupApi;
pub use command::{CommandOutput, CommandRunner};
pub use container_source::ContainerSource;
