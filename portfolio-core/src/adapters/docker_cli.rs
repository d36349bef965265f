//! Docker CLI listing
//!
//! Asks `docker ps` for line-delimited JSON first; older clients or wrappers
//! that do not honour `{{json .}}` get a second run with a tab-separated
//! table format.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{ContainerRecord, ContainerStrategy};
use crate::ports::{CommandRunner, ContainerSource};

const JSON_FORMAT: &str = "{{json .}}";
const TABLE_FORMAT: &str = "table {{.Names}}\t{{.Status}}\t{{.State}}";

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PsLine {
    names: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    state: String,
}

/// Lists containers through the runtime's command-line tool
pub struct DockerCliSource {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    timeout: Duration,
}

impl DockerCliSource {
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            binary: binary.into(),
            timeout,
        }
    }

    fn ps(&self, format: &str) -> Result<String> {
        let output = self
            .runner
            .run(&self.binary, &["ps", "-a", "--format", format], None, self.timeout)?;
        if !output.success() {
            return Err(Error::transport(format!(
                "{} ps exited with {:?}: {}",
                self.binary,
                output.code,
                output.stderr.trim()
            )));
        }
        Ok(output.stdout)
    }

    /// JSON listing; `Ok(None)` when the client rejected or garbled the format
    fn ps_json(&self) -> Result<Option<Vec<ContainerRecord>>> {
        let output = self.runner.run(
            &self.binary,
            &["ps", "-a", "--format", JSON_FORMAT],
            None,
            self.timeout,
        )?;
        if !output.success() {
            debug!(code = ?output.code, stderr = %output.stderr.trim(), "docker ps rejected JSON format");
            return Ok(None);
        }
        match parse_json_lines(&output.stdout) {
            Ok(containers) => Ok(Some(containers)),
            Err(e) => {
                debug!(error = %e, "docker ps JSON output unusable");
                Ok(None)
            }
        }
    }
}

impl ContainerSource for DockerCliSource {
    fn strategy(&self) -> ContainerStrategy {
        ContainerStrategy::DockerCli
    }

    fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        if let Some(containers) = self.ps_json()? {
            return Ok(containers);
        }
        debug!("retrying docker ps as table");
        parse_table(&self.ps(TABLE_FORMAT)?)
    }
}

pub(crate) fn parse_json_lines(output: &str) -> Result<Vec<ContainerRecord>> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let entry: PsLine = serde_json::from_str(line)
                .map_err(|e| Error::parse(format!("bad docker ps line {:?}: {}", line, e)))?;
            // `Names` may list several comma-separated aliases; the first is canonical
            let name = entry.names.split(',').next().unwrap_or_default().to_string();
            Ok(ContainerRecord::new(name, entry.status, &entry.state))
        })
        .collect()
}

pub(crate) fn parse_table(output: &str) -> Result<Vec<ContainerRecord>> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::parse("empty docker ps table output"))?;
    let columns: Vec<String> = header
        .split('\t')
        .map(|c| c.trim().to_ascii_uppercase())
        .collect();
    let column = |name: &str| columns.iter().position(|c| c == name);
    let (name_idx, status_idx, state_idx) = match (column("NAMES"), column("STATUS"), column("STATE")) {
        (Some(n), Some(s), Some(st)) => (n, s, st),
        _ => return Err(Error::parse(format!("unexpected docker ps header: {}", header))),
    };

    lines
        .map(|line| {
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            let field = |idx: usize| {
                fields
                    .get(idx)
                    .copied()
                    .ok_or_else(|| Error::parse(format!("short docker ps row: {}", line)))
            };
            Ok(ContainerRecord::new(field(name_idx)?, field(status_idx)?, field(state_idx)?))
        })
        .collect()
}
