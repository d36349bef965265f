//! Backup commands - statistics, health and creation

use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run_stats(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let report = ctx.report_service.backup_stats(Utc::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let stats = &report.stats;
    println!("{}", "Backups".bold());
    println!();

    let mut summary = output::create_table();
    summary.add_row(vec!["Health".to_string(), output::health(stats.backup_health).to_string()]);
    summary.add_row(vec!["Schedule".to_string(), output::cron(stats.cron_status).to_string()]);
    summary.add_row(vec!["Backups".to_string(), stats.total_backups.to_string()]);
    summary.add_row(vec!["Total size".to_string(), stats.total_size.clone()]);
    summary.add_row(vec![
        "Last backup".to_string(),
        stats.last_backup.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    summary.add_row(vec![
        "Oldest backup".to_string(),
        stats.oldest_backup.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    println!("{}", summary);

    if let Some(error) = &stats.error {
        println!();
        output::error(error);
    }

    if !stats.backups.is_empty() {
        println!();
        let mut table = output::create_table();
        table.set_header(vec!["File", "Size", "Date", "Age"]);
        for backup in &stats.backups {
            table.add_row(vec![
                backup.filename.as_str(),
                backup.size.as_str(),
                backup.date.as_str(),
                backup.age.as_str(),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}

pub fn run(command: BackupCommands) -> Result<()> {
    match command {
        BackupCommands::Create { json } => create(json),
    }
}

fn create(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let spinner = (!json && atty::is(atty::Stream::Stdout)).then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner());
        pb.set_message("Creating backup...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = ctx.report_service.create_backup();

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        output::success(&result.message);
        if let Some(archive) = &result.archive {
            println!("  Archive: {}", archive);
        }
        if let Some(out) = &result.output {
            for line in out.lines() {
                println!("  {}", line.dimmed());
            }
        }
    } else {
        output::error(&result.message);
        if let Some(error) = &result.error {
            eprintln!("  {}", error);
        }
    }

    if result.success {
        Ok(())
    } else {
        anyhow::bail!("backup creation failed")
    }
}
