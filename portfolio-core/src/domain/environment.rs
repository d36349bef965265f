//! Deployment environment model

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where backups live for the current process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentMode {
    /// Developer machine, scratch directory under the working directory
    Local,
    /// Production mount is visible and read directly
    ContainerizedLocalDir,
    /// Production mount is visible but queries go to the host-side Backup API
    ContainerizedDelegated,
}

/// Resolved environment for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EnvironmentContext {
    Local { backup_dir: PathBuf },
    ContainerizedLocalDir { backup_dir: PathBuf },
    ContainerizedDelegated { api_url: String },
}

impl EnvironmentContext {
    pub fn mode(&self) -> EnvironmentMode {
        match self {
            EnvironmentContext::Local { .. } => EnvironmentMode::Local,
            EnvironmentContext::ContainerizedLocalDir { .. } => EnvironmentMode::ContainerizedLocalDir,
            EnvironmentContext::ContainerizedDelegated { .. } => {
                EnvironmentMode::ContainerizedDelegated
            }
        }
    }

    /// Backup directory, if backups are read locally
    pub fn backup_dir(&self) -> Option<&PathBuf> {
        match self {
            EnvironmentContext::Local { backup_dir }
            | EnvironmentContext::ContainerizedLocalDir { backup_dir } => Some(backup_dir),
            EnvironmentContext::ContainerizedDelegated { .. } => None,
        }
    }

    pub fn is_delegated(&self) -> bool {
        matches!(self, EnvironmentContext::ContainerizedDelegated { .. })
    }
}
