//! Output formatting utilities

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use portfolio_core::{CronStatus, HealthStatus};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn health(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Healthy => status.as_str().green(),
        HealthStatus::Warning | HealthStatus::NoBackups => status.as_str().yellow(),
        HealthStatus::Critical | HealthStatus::Error => status.as_str().red(),
        HealthStatus::Unknown => status.as_str().dimmed(),
    }
}

pub fn cron(status: CronStatus) -> ColoredString {
    match status {
        CronStatus::Active => status.as_str().green(),
        CronStatus::NotFound => status.as_str().yellow(),
        CronStatus::Error => status.as_str().red(),
        CronStatus::Unknown => status.as_str().dimmed(),
    }
}
