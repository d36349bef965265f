//! Docker command - show container status

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let report = ctx.container_status_service.get_statuses();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Containers".bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["", "Name", "State", "Status"]);
    for container in &report.containers {
        table.add_row(vec![
            container.icon.as_str(),
            container.name.as_str(),
            container.label.as_str(),
            container.status.as_str(),
        ]);
    }
    println!("{}", table);
    println!(
        "{} of {} running",
        report.running_count(),
        report.containers.len()
    );

    if report.debug.static_fallback {
        println!();
        output::warning("Container runtime unreachable, showing expected services");
        for attempt in &report.debug.attempts {
            println!("  {:?}: {}", attempt.strategy, attempt.error.dimmed());
        }
    }

    Ok(())
}
