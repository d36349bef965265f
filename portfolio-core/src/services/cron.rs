//! Scheduled backup job detection
//!
//! There is no single authoritative place to ask "is the backup job
//! scheduled?", so several independent heuristics are tried in order and the
//! first positive one wins:
//!
//! 1. well-known crontab files mention the job marker
//! 2. `crontab -l` for the current user mentions the job marker
//! 3. the scheduler daemon is active according to systemd
//! 4. the operator set the env flag (e.g. `BACKUP_CRON_ENABLED=true`)
//! 5. a backup newer than the healthy threshold exists
//!
//! The result is approximate. `Active` means *some* evidence of a schedule
//! was found, not that the job is correctly configured: a running daemon
//! (3) or a recent manual backup (5) both count. A heuristic that fails to
//! evaluate is recorded and skipped; it never fails the whole detection.

use std::fs;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::{parse_flag, CronSettings};
use crate::domain::CronStatus;
use crate::ports::CommandRunner;
use crate::services::health::{hours_since, HEALTHY_HOURS};

type EnvLookup = dyn Fn(&str) -> Option<String> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    ConfigFiles,
    UserCrontab,
    SchedulerDaemon,
    EnvFlag,
    RecentBackup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HeuristicOutcome {
    Matched { detail: String },
    NoMatch,
    Failed { reason: String },
}

impl HeuristicOutcome {
    fn matched(detail: impl Into<String>) -> Self {
        HeuristicOutcome::Matched { detail: detail.into() }
    }

    fn failed(reason: impl Into<String>) -> Self {
        HeuristicOutcome::Failed { reason: reason.into() }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, HeuristicOutcome::Matched { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeuristicEvidence {
    pub heuristic: Heuristic,
    #[serde(flatten)]
    pub outcome: HeuristicOutcome,
}

/// Detection verdict with the evidence gathered on the way
#[derive(Debug, Clone, Serialize)]
pub struct CronDetection {
    pub status: CronStatus,
    pub evidence: Vec<HeuristicEvidence>,
}

/// Detector for the recurring backup job
pub struct CronDetector {
    settings: CronSettings,
    runner: Arc<dyn CommandRunner>,
    env: Box<EnvLookup>,
}

impl CronDetector {
    pub fn new(settings: CronSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            settings,
            runner,
            env: Box::new(|key| std::env::var(key).ok()),
        }
    }

    /// Replace the process environment lookup
    pub fn with_env_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Box::new(lookup);
        self
    }

    pub fn detect(&self, now: DateTime<Utc>, latest_backup: Option<DateTime<Utc>>) -> CronStatus {
        self.detect_with_evidence(now, latest_backup).status
    }

    pub fn detect_with_evidence(
        &self,
        now: DateTime<Utc>,
        latest_backup: Option<DateTime<Utc>>,
    ) -> CronDetection {
        let mut evidence = Vec::new();

        let chain = [
            Heuristic::ConfigFiles,
            Heuristic::UserCrontab,
            Heuristic::SchedulerDaemon,
            Heuristic::EnvFlag,
            Heuristic::RecentBackup,
        ];

        for heuristic in chain {
            let outcome = match heuristic {
                Heuristic::ConfigFiles => self.check_config_files(),
                Heuristic::UserCrontab => self.check_user_crontab(),
                Heuristic::SchedulerDaemon => self.check_scheduler_daemon(),
                Heuristic::EnvFlag => self.check_env_flag(),
                Heuristic::RecentBackup => check_recent_backup(now, latest_backup),
            };
            debug!(?heuristic, ?outcome, "cron heuristic evaluated");

            let matched = outcome.is_match();
            evidence.push(HeuristicEvidence { heuristic, outcome });
            if matched {
                return CronDetection {
                    status: CronStatus::Active,
                    evidence,
                };
            }
        }

        CronDetection {
            status: CronStatus::NotFound,
            evidence,
        }
    }

    fn check_config_files(&self) -> HeuristicOutcome {
        let marker = self.settings.job_marker.as_str();
        let mut readable = 0;
        let mut errors = Vec::new();

        for path in &self.settings.config_paths {
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(path) {
                Ok(content) if content.contains(marker) => {
                    return HeuristicOutcome::matched(path.display().to_string());
                }
                Ok(_) => readable += 1,
                Err(e) => errors.push(format!("{}: {}", path.display(), e)),
            }
        }

        if readable == 0 && !errors.is_empty() {
            HeuristicOutcome::failed(errors.join("; "))
        } else {
            HeuristicOutcome::NoMatch
        }
    }

    fn check_user_crontab(&self) -> HeuristicOutcome {
        let timeout = std::time::Duration::from_secs(self.settings.timeout_secs);
        match self
            .runner
            .run(&self.settings.crontab_binary, &["-l"], None, timeout)
        {
            // `crontab -l` exits non-zero when the user simply has no crontab
            Ok(output) if output.success() && output.stdout.contains(&self.settings.job_marker) => {
                HeuristicOutcome::matched("user crontab")
            }
            Ok(_) => HeuristicOutcome::NoMatch,
            Err(e) => HeuristicOutcome::failed(e.to_string()),
        }
    }

    fn check_scheduler_daemon(&self) -> HeuristicOutcome {
        let timeout = std::time::Duration::from_secs(self.settings.timeout_secs);
        let mut errors = Vec::new();

        for unit in &self.settings.daemon_units {
            match self.runner.run(
                &self.settings.systemctl_binary,
                &["is-active", unit.as_str()],
                None,
                timeout,
            ) {
                Ok(output) if output.stdout.trim() == "active" => {
                    return HeuristicOutcome::matched(format!("{} is active", unit));
                }
                Ok(_) => {}
                Err(e) => errors.push(e.to_string()),
            }
        }

        if !errors.is_empty() && errors.len() == self.settings.daemon_units.len() {
            HeuristicOutcome::failed(errors.join("; "))
        } else {
            HeuristicOutcome::NoMatch
        }
    }

    fn check_env_flag(&self) -> HeuristicOutcome {
        let flag = &self.settings.env_flag;
        match (self.env)(flag).as_deref().and_then(parse_flag) {
            Some(true) => HeuristicOutcome::matched(format!("{} is set", flag)),
            _ => HeuristicOutcome::NoMatch,
        }
    }
}

fn check_recent_backup(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> HeuristicOutcome {
    match latest {
        Some(latest) if hours_since(latest, now) < HEALTHY_HOURS => {
            HeuristicOutcome::matched("recent backup present")
        }
        _ => HeuristicOutcome::NoMatch,
    }
}
