//! Core domain entities
//!
//! Pure data structures and formatting rules - no I/O. Everything here is
//! recomputed per request and owned by the request that built it.

pub mod backup;
mod container;
mod environment;
mod health;
pub mod result;

pub use backup::{
    AgeDescriptor, BackupArchiveRecord, BackupCreationResult, BackupEntry,
    BackupInventorySnapshot, BackupStats,
};
pub use container::{
    ContainerRecord, ContainerReport, ContainerState, ContainerStrategy, StrategyAttempt,
    StrategyDebug,
};
pub use environment::{EnvironmentContext, EnvironmentMode};
pub use health::{CronStatus, HealthStatus};
