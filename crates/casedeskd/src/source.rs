//! Raw table providers.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("No source URL configured")]
    NotConfigured,

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Something that can deliver the current export text.
#[async_trait]
pub trait TableSource: Send + Sync {
    async fn fetch(&self) -> Result<String, SourceError>;

    /// Human readable origin for logs.
    fn describe(&self) -> String;
}

/// Fetches the sheet's CSV export over HTTP.
pub struct HttpTableSource {
    url: String,
    client: reqwest::Client,
}

impl HttpTableSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, SourceError> {
        if url.trim().is_empty() {
            return Err(SourceError::NotConfigured);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Request(e.to_string()))?;
        Ok(Self {
            url: url.trim().to_string(),
            client,
        })
    }
}

#[async_trait]
impl TableSource for HttpTableSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        debug!("Fetching {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Reads the export from a local file, re-read on every fetch.
pub struct FileTableSource {
    path: std::path::PathBuf,
}

impl FileTableSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TableSource for FileTableSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| SourceError::Request(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
