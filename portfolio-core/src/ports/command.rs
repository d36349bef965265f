//! Command runner port
//!
//! Every external program (docker CLI, crontab, systemctl, the backup tool)
//! is run through this trait so that a timeout is always attached and tests
//! can substitute canned output.

use std::path::Path;
use std::time::Duration;

use crate::domain::result::Result;

/// Captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, killing it once `timeout` elapses.
    ///
    /// A program that cannot be spawned is a transport error; one that runs
    /// past the deadline is a timeout error. A non-zero exit is NOT an error.
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput>;
}
