//! Dashboard snapshot and "what changed since last run" detection.
//!
//! A snapshot is the whole output of one pipeline run. It is never mutated
//! after construction; the next run replaces it wholesale.

use crate::aggregator::{StatusCounts, VendorCount, VendorCounts};
use crate::case::ClassifiedCase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row-level diagnostics gathered while building a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Rows received from the source
    pub rows_seen: usize,
    /// Rows dropped for a missing id, date or state
    pub dropped_rows: usize,
    /// Cases whose date could not be read (ordered as the epoch)
    pub date_anomalies: usize,
    /// Cases whose date was readable both day-first and month-first
    pub ambiguous_dates: usize,
    /// Cases resolved as not ok only because no ok/nok flag was present
    pub fallback_classifications: usize,
    /// Logical fields with none of their configured columns in the source header
    #[serde(default)]
    pub missing_columns: Vec<String>,
}

impl QualityReport {
    /// True when nothing suspicious was observed.
    pub fn is_clean(&self) -> bool {
        self.dropped_rows == 0
            && self.date_anomalies == 0
            && self.ambiguous_dates == 0
            && self.fallback_classifications == 0
    }
}

/// Aggregated and ranked dashboard view of one source fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub counts: StatusCounts,
    /// Non-sentinel vendors in first-appearance order
    pub vendor_counts: VendorCounts,
    pub recent_open_cases: Vec<ClassifiedCase>,
    pub top_vendors: Vec<VendorCount>,
    pub quality: QualityReport,
}

impl DashboardSnapshot {
    pub fn total_cases(&self) -> usize {
        self.counts.total
    }

    pub fn open(&self) -> usize {
        self.counts.open
    }

    pub fn resolved_ok(&self) -> usize {
        self.counts.resolved_ok
    }

    pub fn resolved_not_ok(&self) -> usize {
        self.counts.resolved_not_ok
    }

    pub fn is_empty(&self) -> bool {
        self.counts.total == 0
    }
}

/// A published snapshot with the refresh cycle that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    /// Sequence number of the refresh cycle, in trigger order
    pub seq: u64,
    pub published_at: DateTime<Utc>,
    pub snapshot: DashboardSnapshot,
}

/// A single change between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotDelta {
    TotalChanged { prev: usize, curr: usize },
    OpenChanged { prev: usize, curr: usize },
    ResolvedOkChanged { prev: usize, curr: usize },
    ResolvedNotOkChanged { prev: usize, curr: usize },
    /// Open case newly present in the recent list
    NewOpenCase { id: String, vendor: String },
    /// Vendor with the most cases changed
    TopVendorChanged { prev: Option<String>, curr: Option<String> },
}

impl SnapshotDelta {
    /// Format as single line for display
    pub fn format(&self) -> String {
        match self {
            Self::TotalChanged { prev, curr } => format!("Total cases {} (was {})", curr, prev),
            Self::OpenChanged { prev, curr } => format!("Open cases {} (was {})", curr, prev),
            Self::ResolvedOkChanged { prev, curr } => {
                format!("Resolved OK {} (was {})", curr, prev)
            }
            Self::ResolvedNotOkChanged { prev, curr } => {
                format!("Resolved NOK {} (was {})", curr, prev)
            }
            Self::NewOpenCase { id, vendor } => format!("New open case {} ({})", id, vendor),
            Self::TopVendorChanged { prev, curr } => format!(
                "Top vendor {} (was {})",
                curr.as_deref().unwrap_or("none"),
                prev.as_deref().unwrap_or("none")
            ),
        }
    }
}

fn count_delta(
    prev: usize,
    curr: usize,
    make: impl FnOnce(usize, usize) -> SnapshotDelta,
) -> Option<SnapshotDelta> {
    (prev != curr).then(|| make(prev, curr))
}

/// Compare two snapshots. Identical snapshots produce no deltas.
pub fn diff_snapshots(prev: &DashboardSnapshot, curr: &DashboardSnapshot) -> Vec<SnapshotDelta> {
    let mut deltas: Vec<SnapshotDelta> = [
        count_delta(prev.counts.total, curr.counts.total, |prev, curr| {
            SnapshotDelta::TotalChanged { prev, curr }
        }),
        count_delta(prev.counts.open, curr.counts.open, |prev, curr| {
            SnapshotDelta::OpenChanged { prev, curr }
        }),
        count_delta(prev.counts.resolved_ok, curr.counts.resolved_ok, |prev, curr| {
            SnapshotDelta::ResolvedOkChanged { prev, curr }
        }),
        count_delta(prev.counts.resolved_not_ok, curr.counts.resolved_not_ok, |prev, curr| {
            SnapshotDelta::ResolvedNotOkChanged { prev, curr }
        }),
    ]
    .into_iter()
    .flatten()
    .collect();

    for case in &curr.recent_open_cases {
        if !prev.recent_open_cases.iter().any(|p| p.id == case.id) {
            deltas.push(SnapshotDelta::NewOpenCase {
                id: case.id.clone(),
                vendor: case.vendor.clone(),
            });
        }
    }

    let prev_top = prev.top_vendors.first().map(|v| v.vendor.clone());
    let curr_top = curr.top_vendors.first().map(|v| v.vendor.clone());
    if prev_top != curr_top {
        deltas.push(SnapshotDelta::TopVendorChanged {
            prev: prev_top,
            curr: curr_top,
        });
    }

    deltas
}

/// Format deltas as plain text, one per line.
pub fn format_deltas_text(deltas: &[SnapshotDelta]) -> String {
    deltas
        .iter()
        .map(SnapshotDelta::format)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CaseStatus;
    use crate::dates::epoch;

    fn open_case(id: &str) -> ClassifiedCase {
        ClassifiedCase {
            id: id.to_string(),
            communication_date: epoch(),
            communication_date_raw: String::new(),
            date_unreadable: false,
            vendor: "EDP".to_string(),
            reason: "N/A".to_string(),
            status: CaseStatus::Open,
        }
    }

    #[test]
    fn test_diff_identical_is_empty() {
        let snap = DashboardSnapshot::default();
        assert!(diff_snapshots(&snap, &snap).is_empty());
    }

    #[test]
    fn test_diff_counts_and_new_case() {
        let prev = DashboardSnapshot {
            counts: StatusCounts {
                total: 1,
                open: 1,
                resolved_ok: 0,
                resolved_not_ok: 0,
            },
            recent_open_cases: vec![open_case("1")],
            ..Default::default()
        };
        let curr = DashboardSnapshot {
            counts: StatusCounts {
                total: 2,
                open: 2,
                resolved_ok: 0,
                resolved_not_ok: 0,
            },
            recent_open_cases: vec![open_case("2"), open_case("1")],
            ..Default::default()
        };
        let deltas = diff_snapshots(&prev, &curr);
        assert_eq!(deltas.len(), 3);
        assert!(matches!(deltas[0], SnapshotDelta::TotalChanged { prev: 1, curr: 2 }));
        assert!(matches!(deltas[1], SnapshotDelta::OpenChanged { .. }));
        assert_eq!(
            deltas[2],
            SnapshotDelta::NewOpenCase {
                id: "2".to_string(),
                vendor: "EDP".to_string()
            }
        );
    }

    #[test]
    fn test_diff_top_vendor() {
        let prev = DashboardSnapshot::default();
        let curr = DashboardSnapshot {
            top_vendors: vec![VendorCount {
                vendor: "Galp".to_string(),
                count: 3,
            }],
            ..Default::default()
        };
        let deltas = diff_snapshots(&prev, &curr);
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].format(), "Top vendor Galp (was none)");
    }

    #[test]
    fn test_format_deltas_text() {
        let deltas = vec![
            SnapshotDelta::OpenChanged { prev: 3, curr: 4 },
            SnapshotDelta::NewOpenCase {
                id: "42".to_string(),
                vendor: "EDP".to_string(),
            },
        ];
        assert_eq!(
            format_deltas_text(&deltas),
            "Open cases 4 (was 3)\nNew open case 42 (EDP)"
        );
    }

    #[test]
    fn test_quality_is_clean() {
        assert!(QualityReport::default().is_clean());
        let report = QualityReport {
            fallback_classifications: 1,
            ..Default::default()
        };
        assert!(!report.is_clean());
    }
}
