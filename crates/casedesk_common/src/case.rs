//! Classified case records.

use crate::classifier::CaseStatus;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Vendor recorded when the row has none.
pub const VENDOR_UNKNOWN: &str = "Unknown";
/// Reason recorded when the row has none.
pub const REASON_NONE: &str = "N/A";
/// Vendor values that never count towards the vendor ranking.
pub const VENDOR_SENTINELS: &[&str] = &[VENDOR_UNKNOWN, "", "-"];

/// A validated, status-tagged case derived from one raw row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCase {
    pub id: String,
    /// Date used for ordering; the epoch when the raw text was unreadable.
    pub communication_date: NaiveDate,
    /// Date text as it appeared in the export.
    pub communication_date_raw: String,
    /// The raw date could not be read; `communication_date` is the epoch.
    #[serde(default)]
    pub date_unreadable: bool,
    pub vendor: String,
    pub reason: String,
    pub status: CaseStatus,
}

impl ClassifiedCase {
    /// Whether this case's vendor counts towards vendor statistics.
    pub fn has_known_vendor(&self) -> bool {
        is_known_vendor(&self.vendor)
    }

    /// Key for recency ordering. Unreadable dates rank below every real date.
    pub fn ordering_date(&self) -> NaiveDate {
        if self.date_unreadable {
            NaiveDate::MIN
        } else {
            self.communication_date
        }
    }
}

pub fn is_known_vendor(vendor: &str) -> bool {
    let vendor = vendor.trim();
    !VENDOR_SENTINELS.contains(&vendor)
}
