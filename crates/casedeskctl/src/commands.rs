//! Command implementations for casedeskctl

use crate::display::{render_envelope, render_snapshot};
use anyhow::{Context, Result};
use casedesk_common::config::CasedeskConfig;
use casedesk_common::pipeline::transform_source;
use casedesk_common::table::parse_table;
use casedesk_common::SnapshotEnvelope;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Parse a local export and render its snapshot.
pub fn transform_file(path: &Path, config: &CasedeskConfig, json: bool) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    debug!("Read {} bytes from {}", text.len(), path.display());

    let batch = parse_table(&text, &config.source.dialect);
    let snapshot = transform_source(batch, &config.transform_options())
        .with_context(|| format!("No snapshot from {}", path.display()))?;

    if json {
        Ok(serde_json::to_string_pretty(&snapshot)?)
    } else {
        Ok(render_snapshot(&snapshot))
    }
}

/// Default daemon snapshot URL derived from the configured bind address.
pub fn default_snapshot_url(config: &CasedeskConfig) -> String {
    format!("http://{}/v1/snapshot", config.server.bind)
}

/// Fetch the daemon's current snapshot.
pub async fn fetch_snapshot(url: &str, json: bool) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Daemon not reachable at {}", url))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Daemon returned {}: {}", status, body.trim());
    }

    let envelope: SnapshotEnvelope = response.json().await.context("Invalid snapshot payload")?;
    if json {
        Ok(serde_json::to_string_pretty(&envelope)?)
    } else {
        Ok(render_envelope(&envelope))
    }
}

/// Effective configuration as TOML.
pub fn show_config(config: &CasedeskConfig) -> Result<String> {
    Ok(config.to_toml()?)
}
