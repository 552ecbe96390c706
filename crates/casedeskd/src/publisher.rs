//! Latest-snapshot holder shared by the refresh loop and the HTTP routes.
//!
//! Refresh cycles are not serialized, so publishes can arrive out of trigger
//! order. The last publish wins; the whole snapshot is swapped under one write
//! lock so readers never see a partial update.

use casedesk_common::snapshot::{diff_snapshots, format_deltas_text, SnapshotDelta};
use casedesk_common::{BatchFailure, DashboardSnapshot, SnapshotEnvelope};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Last failed cycle, kept for `/v1/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub code: i32,
    pub message: String,
}

/// Refresh health as reported by `/v1/health`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublisherHealth {
    pub successful_cycles: u64,
    pub failed_cycles: u64,
    /// Cycle whose snapshot is currently displayed
    pub current_seq: Option<u64>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<FailureRecord>,
}

#[derive(Default)]
struct PublisherState {
    current: Option<Arc<SnapshotEnvelope>>,
    health: PublisherHealth,
}

#[derive(Default)]
pub struct SnapshotPublisher {
    state: RwLock<PublisherState>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed snapshot. Returns what changed against the previous one.
    pub async fn publish(&self, seq: u64, snapshot: DashboardSnapshot) -> Vec<SnapshotDelta> {
        let envelope = Arc::new(SnapshotEnvelope {
            seq,
            published_at: Utc::now(),
            snapshot,
        });

        let mut state = self.state.write().await;
        let deltas = match &state.current {
            Some(prev) => {
                if prev.seq > seq {
                    warn!(
                        "Cycle {} finished after cycle {} and replaces its snapshot",
                        seq, prev.seq
                    );
                }
                diff_snapshots(&prev.snapshot, &envelope.snapshot)
            }
            None => Vec::new(),
        };

        state.health.successful_cycles += 1;
        state.health.current_seq = Some(seq);
        state.health.last_success = Some(envelope.published_at);
        state.current = Some(envelope);
        drop(state);

        if deltas.is_empty() {
            info!("Cycle {} published, no changes", seq);
        } else {
            info!("Cycle {} published, {} changes:\n{}", seq, deltas.len(), format_deltas_text(&deltas));
        }
        deltas
    }

    /// Record a failed cycle. The displayed snapshot is kept.
    pub async fn record_failure(&self, seq: u64, failure: &BatchFailure) {
        let mut state = self.state.write().await;
        state.health.failed_cycles += 1;
        state.health.last_failure = Some(FailureRecord {
            seq,
            at: Utc::now(),
            code: failure.code(),
            message: failure.to_string(),
        });
        let keeping = state.current.as_ref().map(|c| c.seq);
        drop(state);

        match keeping {
            Some(current) => warn!("Cycle {} failed ({}), keeping snapshot of cycle {}", seq, failure, current),
            None => warn!("Cycle {} failed ({}), no snapshot published yet", seq, failure),
        }
    }

    pub async fn latest(&self) -> Option<Arc<SnapshotEnvelope>> {
        self.state.read().await.current.clone()
    }

    pub async fn health(&self) -> PublisherHealth {
        self.state.read().await.health.clone()
    }
}
