//! Child process runner with a hard deadline

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::ports::{CommandOutput, CommandRunner};

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs real processes via `std::process::Command`
#[derive(Debug, Default, Clone)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| Error::transport(format!("failed to run {}: {}", program, e)))?;

        // Drain pipes on their own threads so a chatty child cannot block on a full pipe
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        match wait_with_deadline(&mut child, timeout)? {
            Some(status) => Ok(CommandOutput {
                code: status.code(),
                stdout: stdout.join().unwrap_or_default(),
                stderr: stderr.join().unwrap_or_default(),
            }),
            None => {
                // Readers are left detached: grandchildren may still hold the pipes open
                debug!(program, ?timeout, "killed child after deadline");
                Err(Error::timeout(program, timeout))
            }
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

/// Wait for the child; `Ok(None)` means it was killed at the deadline
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_captures_output_and_exit_code() {
        let runner = SystemCommandRunner::new();
        let output = runner
            .run("sh", &["-c", "echo hello; echo oops >&2; exit 3"], None, Duration::from_secs(5))
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "hello");
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[test]
    fn test_missing_program_is_transport_error() {
        let runner = SystemCommandRunner::new();
        let err = runner
            .run("definitely-not-a-real-binary-xyz", &[], None, Duration::from_secs(1))
            .unwrap_err();
        assert_eq!(err.kind(), crate::domain::result::ErrorKind::Transport);
    }

    #[test]
    fn test_kills_child_at_deadline() {
        let runner = SystemCommandRunner::new();
        let start = Instant::now();
        let err = runner
            .run("sleep", &["10"], None, Duration::from_millis(200))
            .unwrap_err();
        assert!(err.is_timeout());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_runs_in_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemCommandRunner::new();
        let output = runner
            .run("pwd", &[], Some(dir.path()), Duration::from_secs(5))
            .unwrap();
        let reported = std::fs::canonicalize(output.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
