//! Container domain model

use serde::{Deserialize, Serialize};

use super::result::ErrorKind;

/// Normalized container state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Running,
    Stopped,
    Unknown,
}

impl ContainerState {
    /// Map a raw runtime state string (`running`, `exited`, ...) to a state.
    ///
    /// Only the exact string `running` counts as Running.
    pub fn from_runtime(raw: &str) -> Self {
        match raw {
            "running" => ContainerState::Running,
            "exited" | "created" | "paused" | "dead" | "removing" | "restarting" => {
                ContainerState::Stopped
            }
            _ => ContainerState::Unknown,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ContainerState::Running => "🟢",
            ContainerState::Stopped => "🔴",
            ContainerState::Unknown => "⚪",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContainerState::Running => "Running",
            ContainerState::Stopped => "Stopped",
            ContainerState::Unknown => "Unknown",
        }
    }
}

/// One container as reported by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub name: String,
    /// Human status from the runtime, e.g. "Up 3 hours"
    pub status: String,
    pub state: ContainerState,
    pub icon: String,
    pub label: String,
}

impl ContainerRecord {
    pub fn new(name: impl Into<String>, status: impl Into<String>, raw_state: &str) -> Self {
        Self::with_state(name, status, ContainerState::from_runtime(raw_state))
    }

    pub fn with_state(
        name: impl Into<String>,
        status: impl Into<String>,
        state: ContainerState,
    ) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            state,
            icon: state.icon().to_string(),
            label: state.label().to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ContainerState::Running
    }
}

/// Which container strategy produced the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStrategy {
    DockerSocket,
    DockerCli,
    StaticFallback,
}

/// A strategy that was tried and failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: ContainerStrategy,
    pub kind: ErrorKind,
    pub error: String,
}

/// Debug metadata attached to a container listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDebug {
    pub strategy: ContainerStrategy,
    pub static_fallback: bool,
    pub attempts: Vec<StrategyAttempt>,
    pub container_count: usize,
}

/// Payload of the docker status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerReport {
    pub containers: Vec<ContainerRecord>,
    pub debug: StrategyDebug,
}

impl ContainerReport {
    pub fn running_count(&self) -> usize {
        self.containers.iter().filter(|c| c.is_running()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_only_for_exact_string() {
        assert_eq!(ContainerState::from_runtime("running"), ContainerState::Running);
        assert_eq!(ContainerState::from_runtime("Running"), ContainerState::Unknown);
        assert_eq!(ContainerState::from_runtime("exited"), ContainerState::Stopped);
        assert_eq!(ContainerState::from_runtime(""), ContainerState::Unknown);
    }

    #[test]
    fn test_icon_and_label_follow_state() {
        let record = ContainerRecord::new("web", "Exited (0) 2 hours ago", "exited");
        assert_eq!(record.state, ContainerState::Stopped);
        assert_eq!(record.icon, "🔴");
        assert_eq!(record.label, "Stopped");
        assert!(!record.is_running());
    }

    #[test]
    fn test_serialized_shape() {
        let record = ContainerRecord::new("web", "Up 2 hours", "running");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "web");
        assert_eq!(json["state"], "running");
        assert_eq!(json["label"], "Running");
    }
}
