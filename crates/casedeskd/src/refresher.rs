//! Periodic fetch -> transform -> publish cycles.
//!
//! Every interval tick starts an independent cycle. A slow fetch is neither
//! cancelled nor waited for; whichever cycle publishes last is displayed.

use crate::publisher::SnapshotPublisher;
use crate::source::TableSource;
use casedesk_common::pipeline::{transform_source, TransformOptions};
use casedesk_common::table::{parse_table, TableDialect};
use casedesk_common::BatchFailure;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub struct Refresher {
    source: Arc<dyn TableSource>,
    dialect: TableDialect,
    options: TransformOptions,
    publisher: Arc<SnapshotPublisher>,
    next_seq: AtomicU64,
}

impl Refresher {
    pub fn new(
        source: Arc<dyn TableSource>,
        dialect: TableDialect,
        options: TransformOptions,
        publisher: Arc<SnapshotPublisher>,
    ) -> Self {
        Self {
            source,
            dialect,
            options,
            publisher,
            next_seq: AtomicU64::new(1),
        }
    }

    /// Sequence number for the next cycle, in trigger order.
    fn claim_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Run one cycle: fetch, parse, transform, publish.
    pub async fn run_cycle(&self) -> Result<(), BatchFailure> {
        let seq = self.claim_seq();
        self.run_cycle_with_seq(seq).await
    }

    async fn run_cycle_with_seq(&self, seq: u64) -> Result<(), BatchFailure> {
        let started = Instant::now();
        debug!("Cycle {} fetching from {}", seq, self.source.describe());

        let result = match self.source.fetch().await {
            Ok(text) => transform_source(parse_table(&text, &self.dialect), &self.options),
            Err(e) => Err(BatchFailure::Unavailable(e.to_string())),
        };

        match result {
            Ok(snapshot) => {
                self.publisher.publish(seq, snapshot).await;
                debug!("Cycle {} done in {}ms", seq, started.elapsed().as_millis());
                Ok(())
            }
            Err(failure) => {
                self.publisher.record_failure(seq, &failure).await;
                Err(failure)
            }
        }
    }

    /// Start the refresh loop. The first cycle starts immediately.
    pub fn spawn_loop(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        info!("Refresh loop started ({}s interval)", interval.as_secs());
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let seq = self.claim_seq();
                let refresher = Arc::clone(&self);
                // Failures are recorded by the publisher
                tokio::spawn(async move {
                    let _ = refresher.run_cycle_with_seq(seq).await;
                });
            }
        })
    }
}
