//! Backup inventory - scans a backup directory for archives

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::backup::is_archive_name;
use crate::domain::result::{Error, Result};
use crate::domain::{AgeDescriptor, BackupArchiveRecord, BackupInventorySnapshot, HealthStatus};
use crate::services::health;

/// An archive found on disk
#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// List every archive in `dir`, most recently modified first.
///
/// Ties on modification time are broken by filename (descending), which
/// orders generated names by their timestamp token.
pub fn list_archives(dir: &Path) -> Result<Vec<ArchiveFile>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::filesystem(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut archives = Vec::new();
    for entry in entries {
        let entry = entry?;
        let filename = entry.file_name().to_string_lossy().to_string();
        if !is_archive_name(&filename) {
            continue;
        }

        if let Some(archive) = stat_archive(filename, entry.path())? {
            archives.push(archive);
        }
    }

    archives.sort_by(|a, b| {
        b.modified_at
            .cmp(&a.modified_at)
            .then_with(|| b.filename.cmp(&a.filename))
    });
    Ok(archives)
}

/// `Ok(None)` for non-files and for entries removed since the directory was read
fn stat_archive(filename: String, path: PathBuf) -> Result<Option<ArchiveFile>> {
    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Ok(None);
    }

    Ok(Some(ArchiveFile {
        filename,
        path,
        size_bytes: metadata.len(),
        modified_at: DateTime::<Utc>::from(metadata.modified()?),
    }))
}

/// Inventory service for backup statistics
#[derive(Debug, Clone)]
pub struct InventoryService {
    display_limit: usize,
}

impl InventoryService {
    pub fn new(display_limit: usize) -> Self {
        Self { display_limit }
    }

    /// Inventory `dir` as of `now`.
    ///
    /// Never fails: a missing directory yields an Unknown snapshot, an
    /// unreadable one an Error snapshot carrying the message.
    pub fn snapshot(&self, dir: &Path, now: DateTime<Utc>) -> BackupInventorySnapshot {
        if !dir.exists() {
            return BackupInventorySnapshot::empty(HealthStatus::Unknown);
        }

        match self.scan(dir, now) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "backup inventory failed");
                BackupInventorySnapshot::failed(e.to_string())
            }
        }
    }

    fn scan(&self, dir: &Path, now: DateTime<Utc>) -> Result<BackupInventorySnapshot> {
        let archives = list_archives(dir)?;

        let total_size_bytes = archives.iter().map(|a| a.size_bytes).sum();
        let newest = archives.iter().map(|a| a.modified_at).max();
        let oldest = archives.iter().map(|a| a.modified_at).min();

        let backups = archives
            .iter()
            .take(self.display_limit)
            .map(|a| BackupArchiveRecord {
                filename: a.filename.clone(),
                path: a.path.clone(),
                size_bytes: a.size_bytes,
                modified_at: a.modified_at,
                age: AgeDescriptor::between(a.modified_at, now),
            })
            .collect();

        Ok(BackupInventorySnapshot {
            total_count: archives.len(),
            total_size_bytes,
            newest,
            oldest,
            backups,
            health: health::classify(newest, now),
            error: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    use filetime::FileTime;
    use tempfile::tempdir;

    fn write_archive(dir: &Path, name: &str, size: usize, age: Duration) {
        let path = dir.join(name);
        fs::write(&path, vec![0u8; size]).unwrap();
        let mtime = FileTime::from_system_time(SystemTime::now() - age);
        filetime::set_file_mtime(&path, mtime).unwrap();
    }

    #[test]
    fn test_missing_directory_is_unknown() {
        let dir = tempdir().unwrap();
        let snapshot = InventoryService::new(10).snapshot(&dir.path().join("absent"), Utc::now());
        assert_eq!(snapshot.health, HealthStatus::Unknown);
        assert_eq!(snapshot.total_count, 0);
        assert!(snapshot.newest.is_none());
    }

    #[test]
    fn test_empty_directory_has_no_backups() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "not a backup").unwrap();
        let snapshot = InventoryService::new(10).snapshot(dir.path(), Utc::now());
        assert_eq!(snapshot.health, HealthStatus::NoBackups);
        assert_eq!(snapshot.total_count, 0);
    }

    #[test]
    fn test_ignores_non_matching_names_and_directories() {
        let dir = tempdir().unwrap();
        write_archive(dir.path(), "devops-portfolio-backup-1.tar.gz", 10, Duration::from_secs(60));
        write_archive(dir.path(), "devops-portfolio-backup-2.zip", 10, Duration::from_secs(60));
        write_archive(dir.path(), "random.tar.gz", 10, Duration::from_secs(60));
        fs::create_dir(dir.path().join("devops-portfolio-backup-3.tar.gz")).unwrap();

        let snapshot = InventoryService::new(10).snapshot(dir.path(), Utc::now());
        assert_eq!(snapshot.total_count, 1);
        assert_eq!(snapshot.backups[0].filename, "devops-portfolio-backup-1.tar.gz");
    }

    #[test]
    fn test_display_limit_does_not_affect_totals() {
        let dir = tempdir().unwrap();
        for i in 0..12u64 {
            write_archive(
                dir.path(),
                &format!("devops-portfolio-backup-{:02}.tar.gz", i),
                100 + i as usize,
                Duration::from_secs(3600 * (i + 1)),
            );
        }

        let snapshot = InventoryService::new(10).snapshot(dir.path(), Utc::now());
        assert_eq!(snapshot.total_count, 12);
        assert_eq!(snapshot.backups.len(), 10);
        let expected: u64 = (0..12u64).map(|i| 100 + i).sum();
        assert_eq!(snapshot.total_size_bytes, expected);

        // Newest first
        assert_eq!(snapshot.backups[0].filename, "devops-portfolio-backup-00.tar.gz");
        assert_eq!(snapshot.backups[9].filename, "devops-portfolio-backup-09.tar.gz");
        assert!(snapshot.oldest.unwrap() < snapshot.backups[9].modified_at);
    }

    #[test]
    fn test_archive_removed_mid_scan_is_skipped() {
        let dir = tempdir().unwrap();
        write_archive(dir.path(), "devops-portfolio-backup-kept.tar.gz", 10, Duration::from_secs(60));
        let gone = dir.path().join("devops-portfolio-backup-gone.tar.gz");

        let skipped = stat_archive("devops-portfolio-backup-gone.tar.gz".to_string(), gone).unwrap();
        assert!(skipped.is_none());

        let kept = dir.path().join("devops-portfolio-backup-kept.tar.gz");
        let archive = stat_archive("devops-portfolio-backup-kept.tar.gz".to_string(), kept)
            .unwrap()
            .unwrap();
        assert_eq!(archive.size_bytes, 10);
    }

    #[test]
    fn test_ages_and_health() {
        let dir = tempdir().unwrap();
        write_archive(dir.path(), "devops-portfolio-backup-a.tar.gz", 1, Duration::from_secs(3600 * 30));
        write_archive(dir.path(), "devops-portfolio-backup-b.tar.gz", 1, Duration::from_secs(3600 * 24 * 4));

        let snapshot = InventoryService::new(10).snapshot(dir.path(), Utc::now());
        assert_eq!(snapshot.health, HealthStatus::Warning);
        assert_eq!(snapshot.backups[0].age, AgeDescriptor::Yesterday);
        assert_eq!(snapshot.backups[1].age.to_string(), "4 days ago");
    }
}
