//! Portfolio CLI - system status and backup health in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{backups, docker, env, serve};

/// pf - DevOps portfolio system status
#[derive(Parser)]
#[command(name = "pf", version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container status
    Docker {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show backup statistics and health
    Backups {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage backups
    Backup {
        #[command(subcommand)]
        command: backups::BackupCommands,
    },

    /// Show the resolved backup environment
    Env {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the host-side Backup API
    ServeBackupApi {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8001")]
        bind: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = run(cli.command);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Docker { json } => docker::run(json),
        Commands::Backups { json } => backups::run_stats(json),
        Commands::Backup { command } => backups::run(command),
        Commands::Env { json } => env::run(json),
        Commands::ServeBackupApi { bind } => serve::run(&bind),
    }
}
