//! Backup service - backup creation and retention
//!
//! Creation goes one of three ways depending on the environment:
//! - delegated: POST to the host-side Backup API, bounded by the create timeout
//! - local with the external backup tool installed: run the tool
//! - local without the tool: pack the project artifacts into a tar.gz here
//!   and prune old archives
//!
//! Local creation holds an exclusive lock file in the backup directory so two
//! concurrent requests cannot interleave writes and retention.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use fs2::FileExt;
use tracing::{debug, info, warn};

use crate::adapters::archive::write_archive;
use crate::config::BackupSettings;
use crate::domain::backup::{archive_name, format_size};
use crate::domain::{BackupCreationResult, EnvironmentContext};
use crate::ports::{BackupApi, CommandRunner};
use crate::services::inventory::list_archives;

const LOCK_FILE: &str = ".backup.lock";

const PLACEHOLDER_TEXT: &str = "DevOps portfolio backup\n\
No project artifacts were found when this archive was created.\n";

/// Backup service for creating backups
pub struct BackupService {
    settings: BackupSettings,
    working_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
    api: Arc<dyn BackupApi>,
}

impl BackupService {
    pub fn new(
        settings: BackupSettings,
        working_dir: PathBuf,
        runner: Arc<dyn CommandRunner>,
        api: Arc<dyn BackupApi>,
    ) -> Self {
        Self {
            settings,
            working_dir,
            runner,
            api,
        }
    }

    /// Create a backup in the given environment. Never fails; problems are
    /// reported with `success: false`.
    pub fn create(&self, env: &EnvironmentContext) -> BackupCreationResult {
        match env {
            EnvironmentContext::ContainerizedDelegated { api_url } => {
                info!(%api_url, "delegating backup creation");
                self.create_remote()
            }
            EnvironmentContext::Local { backup_dir }
            | EnvironmentContext::ContainerizedLocalDir { backup_dir } => {
                self.create_local(backup_dir)
            }
        }
    }

    fn timeout_message(&self) -> String {
        format!(
            "Backup creation timeout: no result within {} seconds",
            self.settings.create_timeout_secs
        )
    }

    fn create_remote(&self) -> BackupCreationResult {
        match self.api.create() {
            Ok(result) => result,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "remote backup creation timed out");
                BackupCreationResult::failed(self.timeout_message()).with_error(e.to_string())
            }
            Err(e) => {
                warn!(error = %e, "remote backup creation failed");
                BackupCreationResult::failed(format!("Backup API request failed: {}", e))
            }
        }
    }

    fn create_local(&self, backup_dir: &Path) -> BackupCreationResult {
        if let Err(e) = fs::create_dir_all(backup_dir) {
            return BackupCreationResult::failed(format!(
                "Cannot create backup directory {}: {}",
                backup_dir.display(),
                e
            ));
        }

        let _lock = match CreationLock::acquire(backup_dir) {
            Ok(lock) => lock,
            Err(LockError::Held) => {
                return BackupCreationResult::failed("Another backup is already in progress");
            }
            Err(LockError::Io(e)) => {
                return BackupCreationResult::failed(format!("Cannot lock backup directory: {}", e));
            }
        };

        if self.settings.tool_path.is_file() {
            self.run_tool()
        } else {
            self.synthesize(backup_dir)
        }
    }

    /// Run the external backup tool from its own directory
    fn run_tool(&self) -> BackupCreationResult {
        let tool = self.settings.tool_path.to_string_lossy().to_string();
        let tool_dir = self.settings.tool_path.parent();
        info!(%tool, "running backup tool");

        let timeout = std::time::Duration::from_secs(self.settings.create_timeout_secs);
        match self.runner.run(&tool, &[], tool_dir, timeout) {
            Ok(output) if output.success() => {
                BackupCreationResult::succeeded("Backup created successfully", Some(output.stdout))
            }
            Ok(output) => {
                let mut result = BackupCreationResult::failed("Backup tool reported an error")
                    .with_error(output.stderr);
                result.output = Some(output.stdout);
                result
            }
            Err(e) if e.is_timeout() => BackupCreationResult::failed(self.timeout_message()),
            Err(e) => BackupCreationResult::failed(format!("Backup creation failed: {}", e)),
        }
    }

    /// Build an archive from the project artifacts, then apply retention
    fn synthesize(&self, backup_dir: &Path) -> BackupCreationResult {
        let mut log = Vec::new();
        let name = archive_name(Utc::now());
        let dest = backup_dir.join(&name);
        log.push(format!("Backup directory: {}", backup_dir.display()));
        log.push(format!(
            "No backup tool at {}, packing project artifacts",
            self.settings.tool_path.display()
        ));

        let manifest = match write_archive(
            &dest,
            &self.working_dir,
            &self.settings.artifact_paths,
            PLACEHOLDER_TEXT,
        ) {
            Ok(manifest) => manifest,
            Err(e) => {
                let _ = fs::remove_file(&dest);
                warn!(error = %e, "archive creation failed");
                return BackupCreationResult::failed("Backup creation failed")
                    .with_error(e.to_string());
            }
        };

        for path in &manifest.included {
            log.push(format!("Added {}", path.display()));
        }
        for path in &manifest.missing {
            log.push(format!("Skipped {} (not found)", path.display()));
        }
        if manifest.placeholder {
            log.push("No project artifacts found, archived a placeholder".to_string());
        }
        log.push(format!("Created {} ({})", name, format_size(manifest.size_bytes)));

        let removed = enforce_retention(backup_dir, self.settings.retention);
        log.push(format!(
            "Retention: keeping {} most recent, removed {}",
            self.settings.retention, removed
        ));

        info!(archive = %name, removed, "backup archive created");
        BackupCreationResult::succeeded("Backup created successfully", Some(log.join("\n")))
            .with_archive(name)
    }
}

/// Delete all but the `keep` most recently modified archives in `dir`.
///
/// Best-effort: listing or deletion failures are logged and skipped.
/// Returns how many archives were removed.
pub fn enforce_retention(dir: &Path, keep: usize) -> usize {
    let archives = match list_archives(dir) {
        Ok(archives) => archives,
        Err(e) => {
            debug!(error = %e, "retention skipped, cannot list archives");
            return 0;
        }
    };

    archives
        .iter()
        .skip(keep)
        .filter(|archive| match fs::remove_file(&archive.path) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %archive.path.display(), error = %e, "could not remove old archive");
                false
            }
        })
        .count()
}

enum LockError {
    Held,
    Io(std::io::Error),
}

/// Exclusive lock on `<dir>/.backup.lock`, released on drop
struct CreationLock {
    file: File,
}

impl CreationLock {
    fn acquire(dir: &Path) -> Result<Self, LockError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(LOCK_FILE))
            .map_err(LockError::Io)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self { file }),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(LockError::Held),
            Err(e) => Err(LockError::Io(e)),
        }
    }
}

impl Drop for CreationLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Mutex;
    use std::time::{Duration, SystemTime};

    use filetime::FileTime;
    use tempfile::tempdir;

    use crate::domain::result::{Error, Result};
    use crate::domain::BackupStats;
    use crate::ports::CommandOutput;

    /// Records invocations and answers with a fixed result
    struct ScriptedRunner {
        result: fn() -> Result<CommandOutput>,
        calls: Mutex<Vec<(String, Option<PathBuf>)>>,
    }

    impl ScriptedRunner {
        fn new(result: fn() -> Result<CommandOutput>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, program: &str, _: &[&str], dir: Option<&Path>, _: Duration) -> Result<CommandOutput> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), dir.map(Path::to_path_buf)));
            (self.result)()
        }
    }

    struct FakeApi {
        create: fn() -> Result<BackupCreationResult>,
    }

    impl BackupApi for FakeApi {
        fn stats(&self) -> Result<BackupStats> {
            Err(Error::transport("not used"))
        }

        fn create(&self) -> Result<BackupCreationResult> {
            (self.create)()
        }
    }

    fn unreachable_api() -> Arc<dyn BackupApi> {
        Arc::new(FakeApi {
            create: || Err(Error::transport("connection refused")),
        })
    }

    fn ok_output() -> Result<CommandOutput> {
        Ok(CommandOutput {
            code: Some(0),
            stdout: "backup done".to_string(),
            stderr: String::new(),
        })
    }

    fn service(settings: BackupSettings, work: &Path, runner: Arc<dyn CommandRunner>, api: Arc<dyn BackupApi>) -> BackupService {
        BackupService::new(settings, work.to_path_buf(), runner, api)
    }

    fn age_file(path: &Path, age: Duration) {
        let mtime = FileTime::from_system_time(SystemTime::now() - age);
        filetime::set_file_mtime(path, mtime).unwrap();
    }

    #[test]
    fn test_synthesizes_archive_without_tool() {
        let work = tempdir().unwrap();
        fs::write(work.path().join("README.md"), "# portfolio").unwrap();
        let backups = work.path().join("backups");

        let settings = BackupSettings {
            tool_path: work.path().join("missing-backup.sh"),
            ..BackupSettings::default()
        };
        let svc = service(settings, work.path(), ScriptedRunner::new(ok_output), unreachable_api());
        let result = svc.create(&EnvironmentContext::Local { backup_dir: backups.clone() });

        assert!(result.success, "{:?}", result);
        let archive = result.archive.clone().unwrap();
        assert!(backups.join(&archive).is_file());
        let output = result.output.unwrap();
        assert!(output.contains("Added README.md"));
        assert!(output.contains("Skipped app (not found)"));
        assert!(output.contains("Retention"));
    }

    #[test]
    fn test_runs_tool_when_present() {
        let work = tempdir().unwrap();
        let tool_dir = work.path().join("infra/backup");
        fs::create_dir_all(&tool_dir).unwrap();
        let tool = tool_dir.join("backup.sh");
        fs::write(&tool, "#!/bin/sh\n").unwrap();

        let runner = ScriptedRunner::new(ok_output);
        let settings = BackupSettings {
            tool_path: tool.clone(),
            ..BackupSettings::default()
        };
        let svc = service(settings, work.path(), runner.clone(), unreachable_api());
        let result = svc.create(&EnvironmentContext::ContainerizedLocalDir {
            backup_dir: work.path().join("backups"),
        });

        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("backup done"));
        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, tool.to_string_lossy());
        assert_eq!(calls[0].1.as_deref(), Some(tool_dir.as_path()));
    }

    #[test]
    fn test_tool_failure_surfaces_stderr() {
        let work = tempdir().unwrap();
        let tool = work.path().join("backup.sh");
        fs::write(&tool, "#!/bin/sh\n").unwrap();

        let runner = ScriptedRunner::new(|| {
            Ok(CommandOutput {
                code: Some(2),
                stdout: "starting".to_string(),
                stderr: "tar: disk full".to_string(),
            })
        });
        let settings = BackupSettings {
            tool_path: tool,
            ..BackupSettings::default()
        };
        let svc = service(settings, work.path(), runner, unreachable_api());
        let result = svc.create(&EnvironmentContext::Local { backup_dir: work.path().join("b") });

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("tar: disk full"));
        assert_eq!(result.output.as_deref(), Some("starting"));
    }

    #[test]
    fn test_tool_timeout_message() {
        let work = tempdir().unwrap();
        let tool = work.path().join("backup.sh");
        fs::write(&tool, "#!/bin/sh\n").unwrap();

        let runner = ScriptedRunner::new(|| Err(Error::timeout("backup.sh", Duration::from_secs(300))));
        let settings = BackupSettings {
            tool_path: tool,
            ..BackupSettings::default()
        };
        let svc = service(settings, work.path(), runner, unreachable_api());
        let result = svc.create(&EnvironmentContext::Local { backup_dir: work.path().join("b") });

        assert!(!result.success);
        assert!(result.message.contains("timeout"));
    }

    #[test]
    fn test_delegated_transport_failure() {
        let work = tempdir().unwrap();
        let svc = service(BackupSettings::default(), work.path(), ScriptedRunner::new(ok_output), unreachable_api());
        let result = svc.create(&EnvironmentContext::ContainerizedDelegated {
            api_url: "http://host:8001".to_string(),
        });

        assert!(!result.success);
        assert!(result.message.contains("connection refused"));
        assert!(!result.message.contains("timeout"));
    }

    #[test]
    fn test_delegated_timeout() {
        let work = tempdir().unwrap();
        let api = Arc::new(FakeApi {
            create: || Err(Error::timeout("backup create request", Duration::from_secs(300))),
        });
        let svc = service(BackupSettings::default(), work.path(), ScriptedRunner::new(ok_output), api);
        let result = svc.create(&EnvironmentContext::ContainerizedDelegated {
            api_url: "http://host:8001".to_string(),
        });

        assert!(!result.success);
        assert!(result.message.contains("timeout"));
    }

    #[test]
    fn test_delegated_passes_remote_result_through() {
        let work = tempdir().unwrap();
        let api = Arc::new(FakeApi {
            create: || Ok(BackupCreationResult::failed("Backup script not found")),
        });
        let svc = service(BackupSettings::default(), work.path(), ScriptedRunner::new(ok_output), api);
        let result = svc.create(&EnvironmentContext::ContainerizedDelegated {
            api_url: "http://host:8001".to_string(),
        });
        assert!(!result.success);
        assert_eq!(result.message, "Backup script not found");
    }

    #[test]
    fn test_retention_keeps_most_recent() {
        let dir = tempdir().unwrap();
        for (i, hours) in [5u64, 1, 30, 12, 50].iter().enumerate() {
            let path = dir.path().join(format!("devops-portfolio-backup-{}.tar.gz", i));
            fs::write(&path, b"x").unwrap();
            age_file(&path, Duration::from_secs(hours * 3600));
        }
        fs::write(dir.path().join("unrelated.txt"), b"keep me").unwrap();

        assert_eq!(enforce_retention(dir.path(), 3), 2);

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "devops-portfolio-backup-0.tar.gz",
                "devops-portfolio-backup-1.tar.gz",
                "devops-portfolio-backup-3.tar.gz",
                "unrelated.txt",
            ]
        );
    }

    #[test]
    fn test_retention_on_missing_dir_is_noop() {
        let dir = tempdir().unwrap();
        assert_eq!(enforce_retention(&dir.path().join("nope"), 3), 0);
    }

    #[test]
    fn test_concurrent_create_is_rejected_while_locked() {
        let work = tempdir().unwrap();
        let backups = work.path().join("backups");
        fs::create_dir_all(&backups).unwrap();

        let held = match CreationLock::acquire(&backups) {
            Ok(lock) => lock,
            Err(_) => panic!("first lock should succeed"),
        };

        let settings = BackupSettings {
            tool_path: work.path().join("missing.sh"),
            ..BackupSettings::default()
        };
        let svc = service(settings, work.path(), ScriptedRunner::new(ok_output), unreachable_api());
        let result = svc.create(&EnvironmentContext::Local { backup_dir: backups.clone() });
        assert!(!result.success);
        assert!(result.message.contains("already in progress"));

        drop(held);
        let result = svc.create(&EnvironmentContext::Local { backup_dir: backups });
        assert!(result.success);
    }
}
