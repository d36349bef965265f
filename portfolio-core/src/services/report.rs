//! Report service - the facade the CLI and the Backup API call into

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::domain::{BackupCreationResult, BackupStats, EnvironmentContext};
use crate::ports::BackupApi;
use crate::services::backup::BackupService;
use crate::services::cron::{CronDetector, HeuristicEvidence};
use crate::services::environment::EnvironmentResolver;
use crate::services::inventory::InventoryService;

/// Backup statistics plus where they came from
#[derive(Debug, Clone, Serialize)]
pub struct BackupStatsReport {
    #[serde(flatten)]
    pub stats: BackupStats,
    pub environment: EnvironmentContext,
    /// Present only when the cron status was computed in this process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_evidence: Option<Vec<HeuristicEvidence>>,
}

pub struct ReportService {
    resolver: EnvironmentResolver,
    inventory: InventoryService,
    cron: CronDetector,
    backups: BackupService,
    api: Arc<dyn BackupApi>,
}

impl ReportService {
    pub fn new(
        resolver: EnvironmentResolver,
        inventory: InventoryService,
        cron: CronDetector,
        backups: BackupService,
        api: Arc<dyn BackupApi>,
    ) -> Self {
        Self {
            resolver,
            inventory,
            cron,
            backups,
            api,
        }
    }

    pub fn environment(&self) -> EnvironmentContext {
        self.resolver.resolve()
    }

    /// Backup statistics for the current environment, delegating when configured
    pub fn backup_stats(&self, now: DateTime<Utc>) -> BackupStatsReport {
        self.stats_in(self.resolver.resolve(), now)
    }

    /// Backup statistics computed in this process, never delegating
    pub fn local_backup_stats(&self, now: DateTime<Utc>) -> BackupStatsReport {
        self.stats_in(self.resolver.resolve_local(), now)
    }

    pub fn create_backup(&self) -> BackupCreationResult {
        self.backups.create(&self.resolver.resolve())
    }

    pub fn create_local_backup(&self) -> BackupCreationResult {
        self.backups.create(&self.resolver.resolve_local())
    }

    fn stats_in(&self, environment: EnvironmentContext, now: DateTime<Utc>) -> BackupStatsReport {
        let backup_dir = match &environment {
            EnvironmentContext::ContainerizedDelegated { .. } => {
                let stats = match self.api.stats() {
                    Ok(stats) => stats,
                    Err(e) => {
                        warn!(error = %e, "remote backup stats unavailable");
                        BackupStats::failed(format!("Backup API unavailable: {}", e))
                    }
                };
                return BackupStatsReport {
                    stats,
                    environment,
                    cron_evidence: None,
                };
            }
            EnvironmentContext::Local { backup_dir }
            | EnvironmentContext::ContainerizedLocalDir { backup_dir } => backup_dir.clone(),
        };

        let snapshot = self.inventory.snapshot(&backup_dir, now);
        let detection = self.cron.detect_with_evidence(now, snapshot.newest);

        BackupStatsReport {
            stats: BackupStats::from_snapshot(&snapshot, detection.status),
            environment,
            cron_evidence: Some(detection.evidence),
        }
    }
}
