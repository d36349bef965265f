//! HTTP client for the host-side Backup API

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::result::{Error, Result};
use crate::domain::{BackupCreationResult, BackupStats};
use crate::ports::BackupApi;

/// Backup API client
#[derive(Debug, Clone)]
pub struct HttpBackupApi {
    client: Client,
    base_url: String,
    stats_timeout: Duration,
    create_timeout: Duration,
}

impl HttpBackupApi {
    pub fn new(base_url: &str, stats_timeout: Duration, create_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("portfolio-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stats_timeout,
            create_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl BackupApi for HttpBackupApi {
    fn stats(&self) -> Result<BackupStats> {
        let url = self.url("/api/backup/stats");
        debug!(%url, "fetching remote backup stats");
        let response = self
            .client
            .get(&url)
            .timeout(self.stats_timeout)
            .send()
            .map_err(|e| map_request_error(e, "backup stats request", self.stats_timeout))?;
        decode(response, "backup stats request", self.stats_timeout)
    }

    fn create(&self) -> Result<BackupCreationResult> {
        let url = self.url("/api/backup/create");
        debug!(%url, "requesting remote backup creation");
        let response = self
            .client
            .post(&url)
            .timeout(self.create_timeout)
            .send()
            .map_err(|e| map_request_error(e, "backup create request", self.create_timeout))?;
        decode(response, "backup create request", self.create_timeout)
    }
}

/// Decode a JSON body; the host answers failures with a JSON body and a 4xx/5xx
fn decode<T: DeserializeOwned>(response: Response, operation: &str, timeout: Duration) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| map_request_error(e, operation, timeout))?;

    serde_json::from_str(&body).map_err(|e| {
        if status.is_success() {
            Error::parse(format!("{}: invalid JSON body: {}", operation, e))
        } else {
            Error::transport(format!("{}: HTTP {}", operation, status))
        }
    })
}

fn map_request_error(e: reqwest::Error, operation: &str, timeout: Duration) -> Error {
    if e.is_timeout() {
        Error::timeout(operation, timeout)
    } else {
        Error::transport(format!("{}: {}", operation, e))
    }
}
