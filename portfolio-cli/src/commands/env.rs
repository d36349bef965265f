//! Env command - show where backups are read and created

use anyhow::Result;
use colored::Colorize;
use portfolio_core::EnvironmentContext;

use super::get_context;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let environment = ctx.report_service.environment();

    if json {
        println!("{}", serde_json::to_string_pretty(&environment)?);
        return Ok(());
    }

    println!("{}", "Backup Environment".bold());
    match &environment {
        EnvironmentContext::Local { backup_dir } => {
            println!("  Mode:      local");
            println!("  Directory: {}", backup_dir.display());
        }
        EnvironmentContext::ContainerizedLocalDir { backup_dir } => {
            println!("  Mode:      containerized (direct)");
            println!("  Directory: {}", backup_dir.display());
        }
        EnvironmentContext::ContainerizedDelegated { api_url } => {
            println!("  Mode:      containerized (delegated)");
            println!("  Backup API: {}", api_url);
        }
    }

    Ok(())
}
