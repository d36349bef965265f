//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

pub mod backup;
mod container_status;
pub mod cron;
mod environment;
pub mod health;
pub mod inventory;
mod report;

pub use backup::{enforce_retention, BackupService};
pub use container_status::{ContainerStatusService, STATIC_FALLBACK_STATUS};
pub use cron::{CronDetection, CronDetector, Heuristic, HeuristicEvidence, HeuristicOutcome};
pub use environment::EnvironmentResolver;
pub use inventory::{list_archives, ArchiveFile, InventoryService};
pub use report::{BackupStatsReport, ReportService};
