//! Backup domain model

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use super::health::{CronStatus, HealthStatus};

/// Every backup archive starts with this prefix
pub const ARCHIVE_PREFIX: &str = "devops-portfolio-backup-";
/// ...and ends with this suffix
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Wire format for timestamps (local time)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether a filename is a backup archive: prefix, non-empty token, suffix
pub fn is_archive_name(name: &str) -> bool {
    name.strip_prefix(ARCHIVE_PREFIX)
        .and_then(|rest| rest.strip_suffix(ARCHIVE_SUFFIX))
        .is_some_and(|token| !token.is_empty())
}

/// Archive filename for a backup taken at `at`
pub fn archive_name(at: DateTime<Utc>) -> String {
    let timestamp = at.with_timezone(&Local).format("%Y%m%d_%H%M%S");
    let micros = at.timestamp_subsec_micros();
    format!("{}{}-{:06}{}", ARCHIVE_PREFIX, timestamp, micros, ARCHIVE_SUFFIX)
}

/// Format a timestamp for the wire
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}

/// Format bytes as human-readable size (B, KB with one decimal, MB with one decimal)
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes < KB {
        format!("{} B", bytes)
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}

/// How long ago a backup was taken, in whole days
///
/// Rendered as an abstract English label; localization happens in the
/// web layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AgeDescriptor {
    Today,
    Yesterday,
    DaysAgo(i64),
}

impl AgeDescriptor {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => AgeDescriptor::Today,
            1 => AgeDescriptor::Yesterday,
            d => AgeDescriptor::DaysAgo(d),
        }
    }

    /// Elapsed whole days between `modified` and `now`; future times count as today
    pub fn between(modified: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self::from_days((now - modified).num_days())
    }

    pub fn days(&self) -> i64 {
        match self {
            AgeDescriptor::Today => 0,
            AgeDescriptor::Yesterday => 1,
            AgeDescriptor::DaysAgo(d) => *d,
        }
    }
}

impl fmt::Display for AgeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeDescriptor::Today => f.write_str("today"),
            AgeDescriptor::Yesterday => f.write_str("yesterday"),
            AgeDescriptor::DaysAgo(d) => write!(f, "{} days ago", d),
        }
    }
}

impl FromStr for AgeDescriptor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(AgeDescriptor::Today),
            "yesterday" => Ok(AgeDescriptor::Yesterday),
            other => other
                .strip_suffix(" days ago")
                .and_then(|n| n.parse::<i64>().ok())
                .map(AgeDescriptor::DaysAgo)
                .ok_or_else(|| format!("unrecognised age descriptor: {}", other)),
        }
    }
}

impl From<AgeDescriptor> for String {
    fn from(age: AgeDescriptor) -> Self {
        age.to_string()
    }
}

impl TryFrom<String> for AgeDescriptor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One archive on disk
#[derive(Debug, Clone, PartialEq)]
pub struct BackupArchiveRecord {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
    pub age: AgeDescriptor,
}

impl BackupArchiveRecord {
    pub fn size_display(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Point-in-time inventory of a backup directory
#[derive(Debug, Clone)]
pub struct BackupInventorySnapshot {
    pub total_count: usize,
    /// Sum over every matching archive, not just the displayed ones
    pub total_size_bytes: u64,
    pub newest: Option<DateTime<Utc>>,
    pub oldest: Option<DateTime<Utc>>,
    /// Most recent archives first, capped at the display limit
    pub backups: Vec<BackupArchiveRecord>,
    pub health: HealthStatus,
    pub error: Option<String>,
}

impl BackupInventorySnapshot {
    /// A snapshot with no archives and the given verdict
    pub fn empty(health: HealthStatus) -> Self {
        Self {
            total_count: 0,
            total_size_bytes: 0,
            newest: None,
            oldest: None,
            backups: Vec::new(),
            health,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty(HealthStatus::Error)
        }
    }

    pub fn total_size_display(&self) -> String {
        format_size(self.total_size_bytes)
    }
}

/// Archive entry as it appears in the stats payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupEntry {
    pub filename: String,
    pub size: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub date: String,
    pub age: String,
    pub path: String,
}

impl From<&BackupArchiveRecord> for BackupEntry {
    fn from(record: &BackupArchiveRecord) -> Self {
        Self {
            filename: record.filename.clone(),
            size: record.size_display(),
            size_bytes: record.size_bytes,
            date: format_timestamp(record.modified_at),
            age: record.age.to_string(),
            path: record.path.to_string_lossy().to_string(),
        }
    }
}

/// Backup statistics payload
///
/// Shared by the upward `/api/system/backups` payload and the host-side
/// `/api/backup/stats` endpoint, so it must deserialize what the host sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupStats {
    pub total_backups: usize,
    pub total_size: String,
    #[serde(default)]
    pub total_size_bytes: u64,
    pub last_backup: Option<String>,
    pub oldest_backup: Option<String>,
    #[serde(default)]
    pub backups: Vec<BackupEntry>,
    pub cron_status: CronStatus,
    pub backup_health: HealthStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackupStats {
    pub fn from_snapshot(snapshot: &BackupInventorySnapshot, cron_status: CronStatus) -> Self {
        Self {
            total_backups: snapshot.total_count,
            total_size: snapshot.total_size_display(),
            total_size_bytes: snapshot.total_size_bytes,
            last_backup: snapshot.newest.map(format_timestamp),
            oldest_backup: snapshot.oldest.map(format_timestamp),
            backups: snapshot.backups.iter().map(BackupEntry::from).collect(),
            cron_status,
            backup_health: snapshot.health,
            error: snapshot.error.clone(),
        }
    }

    /// Error-flavored payload used when stats cannot be computed or fetched
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            total_backups: 0,
            total_size: format_size(0),
            total_size_bytes: 0,
            last_backup: None,
            oldest_backup: None,
            backups: Vec::new(),
            cron_status: CronStatus::Error,
            backup_health: HealthStatus::Error,
            error: Some(message.into()),
        }
    }
}

/// Outcome of a backup creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupCreationResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,
    pub timestamp: String,
}

impl BackupCreationResult {
    pub fn succeeded(message: impl Into<String>, output: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output,
            error: None,
            archive: None,
            timestamp: format_timestamp(Utc::now()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            error: None,
            archive: None,
            timestamp: format_timestamp(Utc::now()),
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_archive(mut self, archive: impl Into<String>) -> Self {
        self.archive = Some(archive.into());
        self
    }
}
