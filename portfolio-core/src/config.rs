//! Configuration management
//!
//! Read from `settings.json` in the portfolio directory, every field optional:
//! ```json
//! {
//!   "backups": { "productionDir": "/opt/backups", "delegate": true, "apiUrl": "http://host.docker.internal:8001" },
//!   "docker": { "socketPath": "/var/run/docker.sock", "expectedServices": ["devops-portfolio-app"] },
//!   "cron": { "jobMarker": "backup.sh", "envFlag": "BACKUP_CRON_ENABLED" }
//! }
//! ```
//!
//! The loaded [`Config`] is read-only; services receive a clone at construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::result::Result;

/// Backup location and creation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackupSettings {
    /// Production mount; its presence means we run inside the deployment
    pub production_dir: PathBuf,
    /// Scratch directory for development, relative to the working directory
    pub local_dir: PathBuf,
    /// Forward stats/creation to the host-side Backup API when the mount is present
    pub delegate: bool,
    pub api_url: String,
    /// External backup tool, used when present
    pub tool_path: PathBuf,
    /// Paths (relative to the working directory) packed into synthesized archives
    pub artifact_paths: Vec<PathBuf>,
    pub retention: usize,
    pub display_limit: usize,
    pub create_timeout_secs: u64,
    pub stats_timeout_secs: u64,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            production_dir: PathBuf::from("/opt/backups"),
            local_dir: PathBuf::from("backups"),
            delegate: false,
            api_url: "http://host.docker.internal:8001".to_string(),
            tool_path: PathBuf::from("/opt/devops-portfolio/infra/backup/backup.sh"),
            artifact_paths: vec![
                PathBuf::from("app"),
                PathBuf::from("infra"),
                PathBuf::from("docker-compose.yml"),
                PathBuf::from("README.md"),
            ],
            retention: 3,
            display_limit: 10,
            create_timeout_secs: 300,
            stats_timeout_secs: 10,
        }
    }
}

/// Container runtime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockerSettings {
    pub socket_path: PathBuf,
    pub binary: String,
    pub timeout_secs: u64,
    /// Reported as running when neither the socket nor the CLI answers
    pub expected_services: Vec<String>,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from("/var/run/docker.sock"),
            binary: "docker".to_string(),
            timeout_secs: 10,
            expected_services: vec![
                "devops-portfolio-app".to_string(),
                "nginx".to_string(),
                "prometheus".to_string(),
                "grafana".to_string(),
                "node-exporter".to_string(),
            ],
        }
    }
}

/// Scheduled backup job detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CronSettings {
    pub config_paths: Vec<PathBuf>,
    /// Substring identifying the backup job in a crontab
    pub job_marker: String,
    pub env_flag: String,
    pub crontab_binary: String,
    pub systemctl_binary: String,
    /// Unit names tried in order for the scheduler daemon
    pub daemon_units: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            config_paths: vec![
                PathBuf::from("/etc/crontab"),
                PathBuf::from("/etc/cron.d/devops-portfolio-backup"),
                PathBuf::from("/etc/cron.d/backup"),
                PathBuf::from("/var/spool/cron/crontabs/root"),
            ],
            job_marker: "backup.sh".to_string(),
            env_flag: "BACKUP_CRON_ENABLED".to_string(),
            crontab_binary: "crontab".to_string(),
            systemctl_binary: "systemctl".to_string(),
            daemon_units: vec!["cron".to_string(), "crond".to_string()],
            timeout_secs: 5,
        }
    }
}

/// Portfolio configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub backups: BackupSettings,
    pub docker: DockerSettings,
    pub cron: CronSettings,
}

impl Config {
    /// Load config from the portfolio directory
    ///
    /// A malformed settings file falls back to defaults. Environment
    /// variables override the file:
    /// - `PORTFOLIO_DELEGATE_BACKUPS` (true/false)
    /// - `PORTFOLIO_BACKUP_API_URL`
    /// - `PORTFOLIO_PRODUCTION_BACKUP_DIR`
    /// - `PORTFOLIO_DOCKER_SOCKET`
    pub fn load(portfolio_dir: &Path) -> Result<Self> {
        let settings_path = portfolio_dir.join("settings.json");

        let mut config: Config = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %settings_path.display(), error = %e, "ignoring malformed settings file");
                Config::default()
            })
        } else {
            Config::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(delegate) = lookup("PORTFOLIO_DELEGATE_BACKUPS").as_deref().and_then(parse_flag) {
            self.backups.delegate = delegate;
        }
        if let Some(url) = lookup("PORTFOLIO_BACKUP_API_URL") {
            self.backups.api_url = url;
        }
        if let Some(dir) = lookup("PORTFOLIO_PRODUCTION_BACKUP_DIR") {
            self.backups.production_dir = PathBuf::from(dir);
        }
        if let Some(socket) = lookup("PORTFOLIO_DOCKER_SOCKET") {
            self.docker.socket_path = PathBuf::from(socket);
        }
    }

    pub fn docker_timeout(&self) -> Duration {
        Duration::from_secs(self.docker.timeout_secs)
    }

    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.backups.create_timeout_secs)
    }

    pub fn stats_timeout(&self) -> Duration {
        Duration::from_secs(self.backups.stats_timeout_secs)
    }
}

/// Parse a boolean flag the way operators tend to write them
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_settings_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.backups.retention, 3);
        assert_eq!(config.backups.create_timeout_secs, 300);
        assert_eq!(config.cron.job_marker, "backup.sh");
    }

    #[test]
    fn test_partial_settings_keep_other_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"backups": {"delegate": true, "apiUrl": "http://10.0.0.1:8001"}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(config.backups.delegate);
        assert_eq!(config.backups.api_url, "http://10.0.0.1:8001");
        assert_eq!(config.backups.production_dir, PathBuf::from("/opt/backups"));
        assert_eq!(config.docker.binary, "docker");
    }

    #[test]
    fn test_malformed_settings_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.backups.delegate);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORTFOLIO_DELEGATE_BACKUPS", "YES"),
            ("PORTFOLIO_PRODUCTION_BACKUP_DIR", "/mnt/backups"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert!(config.backups.delegate);
        assert_eq!(config.backups.production_dir, PathBuf::from("/mnt/backups"));
        assert_eq!(config.docker.socket_path, PathBuf::from("/var/run/docker.sock"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("yes"), Some(true));
        assert_eq!(parse_flag("On"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
