//! Environment resolution - where do backups live for this process?

use std::path::PathBuf;

use tracing::debug;

use crate::config::BackupSettings;
use crate::domain::EnvironmentContext;

/// Resolves the environment afresh on every call
#[derive(Debug, Clone)]
pub struct EnvironmentResolver {
    settings: BackupSettings,
    working_dir: PathBuf,
}

impl EnvironmentResolver {
    pub fn new(settings: BackupSettings, working_dir: PathBuf) -> Self {
        Self {
            settings,
            working_dir,
        }
    }

    /// Check the production mount and pick a mode.
    ///
    /// - mount absent: `Local`, scratch directory under the working directory
    /// - mount present, delegation on: `ContainerizedDelegated`
    /// - mount present, delegation off: `ContainerizedLocalDir`
    pub fn resolve(&self) -> EnvironmentContext {
        let production_dir = &self.settings.production_dir;

        let context = if !production_dir.exists() {
            EnvironmentContext::Local {
                backup_dir: self.working_dir.join(&self.settings.local_dir),
            }
        } else if self.settings.delegate {
            EnvironmentContext::ContainerizedDelegated {
                api_url: self.settings.api_url.clone(),
            }
        } else {
            EnvironmentContext::ContainerizedLocalDir {
                backup_dir: production_dir.clone(),
            }
        };

        debug!(mode = ?context.mode(), "resolved backup environment");
        context
    }

    /// Same as [`resolve`](Self::resolve) but never delegating.
    ///
    /// Used by the host-side Backup API, which must not forward to itself.
    pub fn resolve_local(&self) -> EnvironmentContext {
        match self.resolve() {
            EnvironmentContext::ContainerizedDelegated { .. } => {
                EnvironmentContext::ContainerizedLocalDir {
                    backup_dir: self.settings.production_dir.clone(),
                }
            }
            local => local,
        }
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.working_dir
    }
}
