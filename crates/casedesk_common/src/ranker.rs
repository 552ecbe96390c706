//! Display orderings derived from the classified case set.

use crate::aggregator::{VendorCount, VendorCounts};
use crate::case::ClassifiedCase;
use crate::classifier::CaseStatus;
use std::cmp::Reverse;

/// Default length of the recent open cases table.
pub const RECENT_OPEN_LIMIT: usize = 10;
/// Default length of the vendor ranking.
pub const TOP_VENDOR_LIMIT: usize = 5;

/// Open cases, most recent communication date first.
///
/// The sort is stable, so cases sharing a date keep their input order.
/// Cases with an unreadable date come last, after any pre-1970 date.
pub fn recent_open_cases(cases: &[ClassifiedCase], limit: usize) -> Vec<ClassifiedCase> {
    let mut open: Vec<&ClassifiedCase> = cases
        .iter()
        .filter(|case| case.status == CaseStatus::Open)
        .collect();
    open.sort_by_key(|case| Reverse(case.ordering_date()));
    open.into_iter().take(limit).cloned().collect()
}

/// Vendors by case count, highest first; ties keep first-appearance order.
pub fn top_vendors(vendors: &VendorCounts, limit: usize) -> Vec<VendorCount> {
    let mut ranked: Vec<&VendorCount> = vendors.entries().iter().collect();
    ranked.sort_by_key(|entry| Reverse(entry.count));
    ranked.into_iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn open_case(id: &str, date: NaiveDate) -> ClassifiedCase {
        ClassifiedCase {
            id: id.to_string(),
            communication_date: date,
            communication_date_raw: date.format("%d/%m/%Y").to_string(),
            date_unreadable: false,
            vendor: "EDP".to_string(),
            reason: "N/A".to_string(),
            status: CaseStatus::Open,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn ids(cases: &[ClassifiedCase]) -> Vec<&str> {
        cases.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_recent_open_sorted_desc_and_filtered() {
        let mut closed = open_case("closed", day(30));
        closed.status = CaseStatus::ResolvedOk;
        let cases = vec![open_case("a", day(1)), closed, open_case("b", day(20)), open_case("c", day(5))];
        let recent = recent_open_cases(&cases, RECENT_OPEN_LIMIT);
        assert_eq!(ids(&recent), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_recent_open_is_stable_for_equal_dates() {
        let cases = vec![open_case("first", day(3)), open_case("second", day(3)), open_case("newer", day(4))];
        let recent = recent_open_cases(&cases, RECENT_OPEN_LIMIT);
        assert_eq!(ids(&recent), vec!["newer", "first", "second"]);
    }

    #[test]
    fn test_recent_open_truncates_after_sort() {
        // Newest case is last in input; truncating before sorting would drop it
        let mut cases: Vec<_> = (1..=12).map(|d| open_case(&format!("c{}", d), day(d))).collect();
        cases.push(open_case("newest", day(28)));
        let recent = recent_open_cases(&cases, RECENT_OPEN_LIMIT);
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, "newest");
        assert_eq!(recent[9].id, "c4");
    }

    #[test]
    fn test_unreadable_dates_sort_last() {
        let mut bad = open_case("bad", crate::dates::epoch());
        bad.date_unreadable = true;
        let cases = vec![
            bad,
            open_case("pre70", NaiveDate::from_ymd_opt(1965, 6, 1).unwrap()),
            open_case("old", NaiveDate::from_ymd_opt(1925, 12, 25).unwrap()),
            open_case("good", day(1)),
        ];
        let recent = recent_open_cases(&cases, RECENT_OPEN_LIMIT);
        assert_eq!(ids(&recent), vec!["good", "pre70", "old", "bad"]);
    }

    #[test]
    fn test_real_epoch_date_is_not_unreadable() {
        let cases = vec![
            open_case("epoch", crate::dates::epoch()),
            open_case("old", NaiveDate::from_ymd_opt(1925, 12, 25).unwrap()),
        ];
        let recent = recent_open_cases(&cases, RECENT_OPEN_LIMIT);
        assert_eq!(ids(&recent), vec!["epoch", "old"]);
    }

    #[test]
    fn test_top_vendors_ties_keep_first_appearance() {
        let mut vendors = VendorCounts::new();
        for v in ["C", "A", "B", "A", "B", "D", "E", "F"] {
            vendors.increment(v);
        }
        let top = top_vendors(&vendors, TOP_VENDOR_LIMIT);
        let names: Vec<_> = top.iter().map(|e| e.vendor.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_top_vendors_empty() {
        assert!(top_vendors(&VendorCounts::new(), TOP_VENDOR_LIMIT).is_empty());
    }
}
