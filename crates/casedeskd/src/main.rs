//! casedesk daemon - keeps a live dashboard snapshot of the complaint sheet.
//!
//! Fetches the sheet export on a fixed interval, classifies and aggregates the
//! cases, and serves the latest snapshot over HTTP.

use anyhow::{Context, Result};
use casedesk_common::config::{load_config, CasedeskConfig};
use casedeskd::publisher::SnapshotPublisher;
use casedeskd::refresher::Refresher;
use casedeskd::server::{self, AppState};
use casedeskd::source::{FileTableSource, HttpTableSource, TableSource};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "casedeskd")]
#[command(about = "Complaint dashboard daemon", long_about = None)]
#[command(version)]
struct Args {
    /// Config file (defaults to $CASEDESK_CONFIG or /etc/casedesk/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single refresh cycle, print the snapshot as JSON and exit
    #[arg(long)]
    once: bool,
}

fn init_logging(fallback_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback_level)),
        )
        .init();
}

fn build_source(config: &CasedeskConfig) -> Result<Arc<dyn TableSource>> {
    let url = config.source.url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        let source = HttpTableSource::new(url, config.source.fetch_timeout())
            .context("Failed to build HTTP source")?;
        Ok(Arc::new(source))
    } else if url.is_empty() {
        anyhow::bail!("source.url is not configured")
    } else {
        Ok(Arc::new(FileTableSource::new(url.trim_start_matches("file://"))))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logging needs the config's level, so load first and report afterwards
    let loaded = load_config(args.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_logging(&level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("[FATAL] {}", e);
            return Err(e).context("Failed to load configuration");
        }
    };

    info!("[BOOT] casedeskd v{} starting", env!("CARGO_PKG_VERSION"));

    let source = build_source(&config)?;
    let source_name = source.describe();
    let publisher = Arc::new(SnapshotPublisher::new());
    let refresher = Arc::new(Refresher::new(
        source,
        config.source.dialect.clone(),
        config.transform_options(),
        Arc::clone(&publisher),
    ));

    if args.once {
        refresher.run_cycle().await.context("Refresh cycle failed")?;
        if let Some(envelope) = publisher.latest().await {
            println!("{}", serde_json::to_string_pretty(envelope.as_ref())?);
        }
        return Ok(());
    }

    let interval = config.source.refresh_interval();
    let refresh_handle = Arc::clone(&refresher).spawn_loop(interval);
    info!("[BOOT] Source: {}", source_name);

    let state = AppState::new(publisher, source_name, config.source.refresh_interval_secs);

    info!("[READY] casedeskd operational");
    tokio::select! {
        result = server::run(state, &config.server.bind) => {
            result.context("HTTP server error")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down gracefully");
        }
    }

    refresh_handle.abort();
    Ok(())
}
