//! CLI command implementations

pub mod backups;
pub mod docker;
pub mod env;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use portfolio_core::PortfolioContext;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `--verbose` selects debug output.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "portfolio_core=debug,pf=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Get the portfolio directory from environment or default
pub fn get_portfolio_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("PORTFOLIO_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".portfolio"))
        .context("Could not find home directory (set PORTFOLIO_DIR)")
}

/// Build the portfolio context for the current working directory
pub fn get_context() -> Result<PortfolioContext> {
    let portfolio_dir = get_portfolio_dir()?;
    let working_dir = std::env::current_dir().context("Failed to read current directory")?;

    PortfolioContext::new(&portfolio_dir, &working_dir)
        .context("Failed to initialize portfolio context")
}
