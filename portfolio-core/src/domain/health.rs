//! Backup health and cron status verdicts

use std::fmt;

use serde::{Deserialize, Serialize};

/// Recency classification of the newest backup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
    #[serde(rename = "No Backups")]
    NoBackups,
    Unknown,
    Error,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Warning => "Warning",
            HealthStatus::Critical => "Critical",
            HealthStatus::NoBackups => "No Backups",
            HealthStatus::Unknown => "Unknown",
            HealthStatus::Error => "Error",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a recurring backup job appears to be configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CronStatus {
    Active,
    #[serde(rename = "Not Found")]
    NotFound,
    Unknown,
    Error,
}

impl CronStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CronStatus::Active => "Active",
            CronStatus::NotFound => "Not Found",
            CronStatus::Unknown => "Unknown",
            CronStatus::Error => "Error",
        }
    }
}

impl fmt::Display for CronStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
