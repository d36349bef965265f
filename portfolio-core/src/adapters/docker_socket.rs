//! Docker Engine API over the control socket
//!
//! Uses bollard on a private current-thread runtime so the rest of the core
//! stays synchronous. The whole listing is bounded by the configured timeout.

use std::path::PathBuf;
use std::time::Duration;

use bollard::container::ListContainersOptions;
use bollard::errors::Error as BollardError;
use bollard::models::ContainerSummary;
use bollard::{Docker, API_DEFAULT_VERSION};
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{ContainerRecord, ContainerStrategy};
use crate::ports::ContainerSource;

/// Lists containers over the runtime's control socket
#[derive(Debug, Clone)]
pub struct DockerSocketSource {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DockerSocketSource {
    pub fn new(socket_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            timeout,
        }
    }

    async fn fetch(&self) -> Result<Vec<ContainerSummary>> {
        let socket = self.socket_path.to_string_lossy();
        // bollard takes whole seconds; the outer tokio timeout enforces the exact bound
        let docker = Docker::connect_with_socket(
            &socket,
            self.timeout.as_secs().max(1),
            API_DEFAULT_VERSION,
        )
        .map_err(|e| map_docker_error(e, &socket))?;

        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        docker
            .list_containers(Some(options))
            .await
            .map_err(|e| map_docker_error(e, &socket))
    }
}

impl ContainerSource for DockerSocketSource {
    fn strategy(&self) -> ContainerStrategy {
        ContainerStrategy::DockerSocket
    }

    fn list_containers(&self) -> Result<Vec<ContainerRecord>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::transport(format!("cannot start socket runtime: {}", e)))?;

        let summaries = runtime.block_on(async {
            tokio::time::timeout(self.timeout, self.fetch())
                .await
                .map_err(|_| Error::timeout("control socket listing", self.timeout))?
        })?;

        debug!(count = summaries.len(), "listed containers over control socket");
        Ok(summaries.into_iter().map(record_from_summary).collect())
    }
}

fn map_docker_error(e: BollardError, socket: &str) -> Error {
    match e {
        BollardError::RequestTimeoutError { .. } => {
            Error::timeout(format!("control socket request to {}", socket), Duration::ZERO)
        }
        BollardError::JsonDataError { .. } | BollardError::JsonSerdeError { .. } => {
            Error::parse(format!("container list from {} is not valid: {}", socket, e))
        }
        other => Error::transport(format!("{}: {}", socket, other)),
    }
}

/// Engine names carry a leading `/`; the first name is canonical
fn record_from_summary(summary: ContainerSummary) -> ContainerRecord {
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .unwrap_or_default();
    ContainerRecord::new(
        name,
        summary.status.unwrap_or_default(),
        summary.state.as_deref().unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::result::ErrorKind;
    use crate::domain::ContainerState;

    fn summary(names: &[&str], status: &str, state: &str) -> ContainerSummary {
        ContainerSummary {
            names: Some(names.iter().map(|n| n.to_string()).collect()),
            status: Some(status.to_string()),
            state: Some(state.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_strips_leading_slash() {
        let record = record_from_summary(summary(&["/devops-portfolio-app", "/alias"], "Up 2 hours", "running"));
        assert_eq!(record.name, "devops-portfolio-app");
        assert_eq!(record.status, "Up 2 hours");
        assert_eq!(record.state, ContainerState::Running);
    }

    #[test]
    fn test_record_with_missing_fields() {
        let record = record_from_summary(ContainerSummary::default());
        assert_eq!(record.name, "");
        assert_eq!(record.state, ContainerState::Unknown);

        let exited = record_from_summary(summary(&["/grafana"], "Exited (0) 1 day ago", "exited"));
        assert_eq!(exited.state, ContainerState::Stopped);
    }

    #[test]
    fn test_missing_socket_is_transport_error() {
        let source = DockerSocketSource::new("/nonexistent/docker.sock", Duration::from_secs(1));
        let err = source.list_containers().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
