//! Case counting.
//!
//! One left-to-right pass over the classified cases. Status counts are
//! exhaustive and mutually exclusive; vendor counts skip sentinel vendors and
//! keep the order in which each vendor first appeared.

use crate::case::ClassifiedCase;
use crate::classifier::CaseStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Per-status counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub open: usize,
    pub resolved_ok: usize,
    pub resolved_not_ok: usize,
}

impl StatusCounts {
    pub fn get(&self, status: CaseStatus) -> usize {
        match status {
            CaseStatus::Open => self.open,
            CaseStatus::ResolvedOk => self.resolved_ok,
            CaseStatus::ResolvedNotOk => self.resolved_not_ok,
            CaseStatus::Unknown => 0,
        }
    }

    /// Share of resolved cases confirmed ok (0.0-1.0).
    pub fn ok_rate(&self) -> f32 {
        let resolved = self.resolved_ok + self.resolved_not_ok;
        if resolved == 0 {
            0.0
        } else {
            self.resolved_ok as f32 / resolved as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCount {
    pub vendor: String,
    pub count: usize,
}

/// Vendor -> case count, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<VendorCount>", into = "Vec<VendorCount>")]
pub struct VendorCounts {
    entries: Vec<VendorCount>,
    index: HashMap<String, usize>,
}

impl VendorCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, vendor: &str) {
        match self.index.get(vendor) {
            Some(&pos) => self.entries[pos].count += 1,
            None => {
                self.index.insert(vendor.to_string(), self.entries.len());
                self.entries.push(VendorCount {
                    vendor: vendor.to_string(),
                    count: 1,
                });
            }
        }
    }

    pub fn get(&self, vendor: &str) -> Option<usize> {
        self.index.get(vendor).map(|&pos| self.entries[pos].count)
    }

    /// Entries in first-appearance order.
    pub fn entries(&self) -> &[VendorCount] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

impl From<Vec<VendorCount>> for VendorCounts {
    fn from(entries: Vec<VendorCount>) -> Self {
        let mut counts = VendorCounts::new();
        for entry in entries {
            match counts.index.get(&entry.vendor) {
                Some(&pos) => counts.entries[pos].count += entry.count,
                None => {
                    counts.index.insert(entry.vendor.clone(), counts.entries.len());
                    counts.entries.push(entry);
                }
            }
        }
        counts
    }
}

impl From<VendorCounts> for Vec<VendorCount> {
    fn from(counts: VendorCounts) -> Self {
        counts.entries
    }
}

/// Accumulator for a single pass over classified cases.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    counts: StatusCounts,
    vendors: VendorCounts,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one case. A case with `Unknown` status is skipped entirely so
    /// that `total` stays the sum of the status buckets.
    pub fn record(&mut self, case: &ClassifiedCase) {
        match case.status {
            CaseStatus::Open => self.counts.open += 1,
            CaseStatus::ResolvedOk => self.counts.resolved_ok += 1,
            CaseStatus::ResolvedNotOk => self.counts.resolved_not_ok += 1,
            CaseStatus::Unknown => {
                // classify() never yields Unknown
                warn!("Case {} reached the aggregator with unknown status, skipped", case.id);
                return;
            }
        }
        self.counts.total += 1;

        if case.has_known_vendor() {
            self.vendors.increment(&case.vendor);
        }
    }

    pub fn finish(self) -> (StatusCounts, VendorCounts) {
        (self.counts, self.vendors)
    }
}

/// Fold a case sequence into status and vendor counts.
pub fn aggregate<'a>(cases: impl IntoIterator<Item = &'a ClassifiedCase>) -> (StatusCounts, VendorCounts) {
    let mut agg = Aggregator::new();
    for case in cases {
        agg.record(case);
    }
    agg.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::VENDOR_UNKNOWN;
    use crate::dates::epoch;

    fn case(id: &str, vendor: &str, status: CaseStatus) -> ClassifiedCase {
        ClassifiedCase {
            id: id.to_string(),
            communication_date: epoch(),
            communication_date_raw: String::new(),
            date_unreadable: false,
            vendor: vendor.to_string(),
            reason: "N/A".to_string(),
            status,
        }
    }

    #[test]
    fn test_status_counts_are_exhaustive() {
        let cases = vec![
            case("1", "EDP", CaseStatus::Open),
            case("2", "EDP", CaseStatus::ResolvedOk),
            case("3", "Galp", CaseStatus::ResolvedNotOk),
            case("4", VENDOR_UNKNOWN, CaseStatus::ResolvedNotOk),
        ];
        let (counts, _) = aggregate(&cases);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.open + counts.resolved_ok + counts.resolved_not_ok, counts.total);
        assert_eq!(counts.get(CaseStatus::ResolvedNotOk), 2);
    }

    #[test]
    fn test_unknown_status_keeps_totals_consistent() {
        let cases = vec![
            case("1", "EDP", CaseStatus::Open),
            case("2", "Galp", CaseStatus::Unknown),
        ];
        let (counts, vendors) = aggregate(&cases);
        assert_eq!(counts.total, 1);
        assert_eq!(counts.open + counts.resolved_ok + counts.resolved_not_ok, counts.total);
        assert_eq!(vendors.get("Galp"), None);
    }

    #[test]
    fn test_vendor_sentinels_excluded() {
        let cases = vec![
            case("1", VENDOR_UNKNOWN, CaseStatus::Open),
            case("2", "-", CaseStatus::Open),
            case("3", "", CaseStatus::Open),
            case("4", "Galp", CaseStatus::Open),
        ];
        let (_, vendors) = aggregate(&cases);
        assert_eq!(vendors.len(), 1);
        assert_eq!(vendors.get("Galp"), Some(1));
        assert_eq!(vendors.get("-"), None);
    }

    #[test]
    fn test_vendor_first_appearance_order() {
        let cases = vec![
            case("1", "B", CaseStatus::Open),
            case("2", "A", CaseStatus::Open),
            case("3", "B", CaseStatus::Open),
        ];
        let (_, vendors) = aggregate(&cases);
        let names: Vec<_> = vendors.entries().iter().map(|e| e.vendor.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(vendors.get("B"), Some(2));
        assert_eq!(vendors.total(), 3);
    }

    #[test]
    fn test_order_does_not_change_counts() {
        let mut cases = vec![
            case("1", "A", CaseStatus::Open),
            case("2", "B", CaseStatus::ResolvedOk),
            case("3", "A", CaseStatus::ResolvedNotOk),
        ];
        let (forward, fv) = aggregate(&cases);
        cases.reverse();
        let (backward, bv) = aggregate(&cases);
        assert_eq!(forward, backward);
        assert_eq!(fv.get("A"), bv.get("A"));
        assert_eq!(fv.get("B"), bv.get("B"));
    }

    #[test]
    fn test_vendor_counts_serde_as_list() {
        let mut vendors = VendorCounts::new();
        vendors.increment("EDP");
        vendors.increment("EDP");
        let json = serde_json::to_string(&vendors).unwrap();
        assert_eq!(json, r#"[{"vendor":"EDP","count":2}]"#);
        let back: VendorCounts = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vendors);
    }

    #[test]
    fn test_ok_rate() {
        let counts = StatusCounts {
            total: 5,
            open: 1,
            resolved_ok: 3,
            resolved_not_ok: 1,
        };
        assert!((counts.ok_rate() - 0.75).abs() < f32::EPSILON);
        assert_eq!(StatusCounts::default().ok_rate(), 0.0);
    }
}
