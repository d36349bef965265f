//! Result and error types for the core library

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Components never let these escape their public entry points; they are
/// downgraded to a status value (health, cron status, `success: false`) at
/// the component boundary. Inside a component they travel through `?`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Operation timed out after {}s: {operation}", .after.as_secs())]
    Timeout { operation: String, after: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a filesystem error
    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self::Filesystem(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Coarse classification used in debug payloads
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Transport(_) => ErrorKind::Transport,
            Error::Parse(_) | Error::Json(_) => ErrorKind::Parse,
            Error::Filesystem(_) | Error::Io(_) => ErrorKind::Filesystem,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Other(_) => ErrorKind::Unknown,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Parse,
    Filesystem,
    Timeout,
    Unknown,
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::transport("refused").kind(), ErrorKind::Transport);
        assert_eq!(Error::parse("bad json").kind(), ErrorKind::Parse);
        assert_eq!(Error::Other("?".into()).kind(), ErrorKind::Unknown);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(Error::from(io).kind(), ErrorKind::Filesystem);

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json).kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_timeout_message() {
        let err = Error::timeout("backup script", Duration::from_secs(300));
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Timeout);
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("300s"));
    }
}
