//! Portfolio Core - system introspection and backup health
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (ContainerRecord, BackupStats, HealthStatus, etc.)
//! - **ports**: Trait definitions for external collaborators (ContainerSource, CommandRunner, BackupApi)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (Docker socket, docker CLI, HTTP, tar.gz)
//!
//! Nothing is cached between calls: every report reflects the filesystem,
//! the container runtime and the environment at the time it is requested.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::{DockerCliSource, DockerSocketSource, HttpBackupApi, SystemCommandRunner};
use config::Config;
use ports::{BackupApi, CommandRunner, ContainerSource};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorKind, Result};
pub use domain::{
    BackupCreationResult, BackupStats, ContainerRecord, ContainerReport, CronStatus,
    EnvironmentContext, EnvironmentMode, HealthStatus,
};

/// Main context for portfolio operations
///
/// Holds the configuration and all services, wired to the real system.
pub struct PortfolioContext {
    pub config: Config,
    pub container_status_service: ContainerStatusService,
    pub report_service: ReportService,
}

impl PortfolioContext {
    /// Load `settings.json` from `portfolio_dir`, apply env overrides and wire services
    pub fn new(portfolio_dir: &Path, working_dir: &Path) -> Result<Self> {
        let config = Config::load(portfolio_dir)?;
        Self::with_config(config, working_dir)
    }

    /// Wire services from an already-built configuration
    pub fn with_config(config: Config, working_dir: &Path) -> Result<Self> {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new());

        let sources: Vec<Arc<dyn ContainerSource>> = vec![
            Arc::new(DockerSocketSource::new(
                config.docker.socket_path.clone(),
                config.docker_timeout(),
            )),
            Arc::new(DockerCliSource::new(
                Arc::clone(&runner),
                config.docker.binary.clone(),
                config.docker_timeout(),
            )),
        ];
        let container_status_service =
            ContainerStatusService::new(sources, config.docker.expected_services.clone());

        let api: Arc<dyn BackupApi> = Arc::new(HttpBackupApi::new(
            &config.backups.api_url,
            config.stats_timeout(),
            config.create_timeout(),
        )?);

        let report_service = ReportService::new(
            EnvironmentResolver::new(config.backups.clone(), working_dir.to_path_buf()),
            InventoryService::new(config.backups.display_limit),
            CronDetector::new(config.cron.clone(), Arc::clone(&runner)),
            BackupService::new(
                config.backups.clone(),
                working_dir.to_path_buf(),
                Arc::clone(&runner),
                Arc::clone(&api),
            ),
            api,
        );

        Ok(Self {
            config,
            container_status_service,
            report_service,
        })
    }
}
