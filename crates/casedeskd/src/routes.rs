//! API routes for casedeskd

use crate::publisher::PublisherHealth;
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use casedesk_common::SnapshotEnvelope;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Snapshot Routes
// ============================================================================

pub fn snapshot_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/snapshot", get(get_snapshot))
}

async fn get_snapshot(
    State(state): State<AppStateArc>,
) -> Result<Json<SnapshotEnvelope>, (StatusCode, String)> {
    match state.publisher.latest().await {
        Some(envelope) => Ok(Json(envelope.as_ref().clone())),
        None => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "No snapshot published yet".to_string(),
        )),
    }
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub source: String,
    pub refresh_interval_secs: u64,
    pub refresh: PublisherHealth,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(get_health))
}

async fn get_health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let refresh = state.publisher.health().await;
    let status = match (&refresh.current_seq, &refresh.last_failure) {
        (None, _) => "starting",
        (Some(current), Some(failure)) if failure.seq > *current => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        source: state.source.clone(),
        refresh_interval_secs: state.refresh_interval_secs,
        refresh,
    })
}
