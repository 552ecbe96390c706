//! HTTP surface tests for casedeskd.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use casedesk_common::pipeline::{transform, TransformOptions};
use casedesk_common::table::{parse_table, TableDialect};
use casedesk_common::{BatchFailure, SnapshotEnvelope};
use casedeskd::publisher::SnapshotPublisher;
use casedeskd::routes::HealthResponse;
use casedeskd::server::{router, AppState};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

const EXPORT: &str = "Nº;Data comunicação;Estado;Ok/NO;Fornecedor;Motivo\n\
1;25/12/2025;Aberto;;EDP;Leitura\n\
2;20/12/2025;Fechado;OK;Galp;Fatura\n";

fn state(publisher: Arc<SnapshotPublisher>) -> AppState {
    AppState::new(publisher, "test-source".to_string(), 300)
}

async fn get(publisher: Arc<SnapshotPublisher>, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router(state(publisher))
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, body)
}

#[tokio::test]
async fn test_snapshot_unavailable_before_first_cycle() {
    let (status, _) = get(Arc::new(SnapshotPublisher::new()), "/v1/snapshot").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_snapshot_served_after_publish() {
    let publisher = Arc::new(SnapshotPublisher::new());
    let records = parse_table(EXPORT, &TableDialect::default()).unwrap();
    let snapshot = transform(&records, &TransformOptions::default()).unwrap();
    publisher.publish(1, snapshot.clone()).await;

    let (status, body) = get(Arc::clone(&publisher), "/v1/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    let envelope: SnapshotEnvelope = serde_json::from_slice(&body).unwrap();
    assert_eq!(envelope.seq, 1);
    assert_eq!(envelope.snapshot, snapshot);
}

#[tokio::test]
async fn test_health_reports_degraded_after_failure() {
    let publisher = Arc::new(SnapshotPublisher::new());

    let (_, body) = get(Arc::clone(&publisher), "/v1/health").await;
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "starting");
    assert_eq!(health.source, "test-source");

    let records = parse_table(EXPORT, &TableDialect::default()).unwrap();
    let snapshot = transform(&records, &TransformOptions::default()).unwrap();
    publisher.publish(1, snapshot).await;
    publisher.record_failure(2, &BatchFailure::EmptyBatch).await;

    let (status, body) = get(Arc::clone(&publisher), "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(health.status, "degraded");
    assert_eq!(health.refresh.successful_cycles, 1);
    assert_eq!(health.refresh.failed_cycles, 1);
    assert_eq!(health.refresh.current_seq, Some(1));
}
