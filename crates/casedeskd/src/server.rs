//! HTTP server for casedeskd

use crate::publisher::SnapshotPublisher;
use crate::routes;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub publisher: Arc<SnapshotPublisher>,
    pub start_time: Instant,
    /// Where snapshots come from, for `/v1/health`
    pub source: String,
    pub refresh_interval_secs: u64,
}

impl AppState {
    pub fn new(publisher: Arc<SnapshotPublisher>, source: String, refresh_interval_secs: u64) -> Self {
        Self {
            publisher,
            start_time: Instant::now(),
            source,
            refresh_interval_secs,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::snapshot_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server
pub async fn run(state: AppState, bind: &str) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("  Listening on http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}
