//! Raw rows -> dashboard snapshot.
//!
//! extract -> drop incomplete -> classify -> aggregate -> rank -> assemble.
//! Row-level problems are counted and logged, never propagated. Only an empty
//! batch or an upstream structural failure makes the run fail, and that is
//! returned as a value so the caller can keep its previous snapshot.

use crate::aggregator::aggregate;
use crate::case::{ClassifiedCase, REASON_NONE, VENDOR_UNKNOWN};
use crate::classifier::{classify, normalize, ClassificationBasis};
use crate::dates::{epoch, parse_communication_date};
use crate::error::{BatchFailure, TableError};
use crate::ranker::{recent_open_cases, top_vendors, RECENT_OPEN_LIMIT, TOP_VENDOR_LIMIT};
use crate::record::{FieldMap, RawRecord};
use crate::snapshot::{DashboardSnapshot, QualityReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Parameters of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOptions {
    pub fields: FieldMap,
    pub recent_open_limit: usize,
    pub top_vendor_limit: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            fields: FieldMap::default(),
            recent_open_limit: RECENT_OPEN_LIMIT,
            top_vendor_limit: TOP_VENDOR_LIMIT,
        }
    }
}

/// Turn one raw row into a case, or `None` if id, date or state is missing.
pub fn classify_record(
    record: &RawRecord,
    fields: &FieldMap,
    quality: &mut QualityReport,
) -> Option<ClassifiedCase> {
    let extracted = fields.extract(record);
    let Some((id, date_raw, state)) = extracted.required() else {
        debug!("Dropping row: missing {}", extracted.missing_required().join(", "));
        quality.dropped_rows += 1;
        return None;
    };

    let (communication_date, date_unreadable) = match parse_communication_date(date_raw) {
        Ok(reading) => {
            if reading.ambiguous {
                debug!("Case {}: date '{}' read day-first but is ambiguous", id, date_raw);
                quality.ambiguous_dates += 1;
            }
            (reading.date, false)
        }
        Err(e) => {
            warn!("Case {}: {}; reported as {} and ranked last", id, e, epoch());
            quality.date_anomalies += 1;
            (epoch(), true)
        }
    };

    let classification = classify(&normalize(Some(state)), &normalize(extracted.ok_flag));
    if classification.basis == ClassificationBasis::Fallback {
        debug!(
            "Case {}: state '{}' without ok/nok flag, presumed not ok",
            id, state
        );
        quality.fallback_classifications += 1;
    }

    Some(ClassifiedCase {
        id: id.to_string(),
        communication_date,
        communication_date_raw: date_raw.to_string(),
        date_unreadable,
        vendor: extracted.vendor.unwrap_or(VENDOR_UNKNOWN).to_string(),
        reason: extracted.reason.unwrap_or(REASON_NONE).to_string(),
        status: classification.status,
    })
}

/// Logical fields the batch's header cannot supply. Rows of one table share
/// the header, so the first row's columns stand for it.
fn missing_columns(records: &[RawRecord], fields: &FieldMap) -> Vec<String> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    let header: Vec<&str> = first.columns().collect();
    let missing: Vec<String> = fields
        .missing_columns(&header)
        .into_iter()
        .map(|field| field.as_str().to_string())
        .collect();

    if !missing.is_empty() {
        warn!("Source header has no configured column for: {}", missing.join(", "));
    }
    missing
}

/// Build a snapshot from the rows of one fetch.
pub fn transform(
    records: &[RawRecord],
    options: &TransformOptions,
) -> Result<DashboardSnapshot, BatchFailure> {
    if records.is_empty() {
        warn!("Transform skipped: source returned no rows");
        return Err(BatchFailure::EmptyBatch);
    }

    let mut quality = QualityReport {
        rows_seen: records.len(),
        missing_columns: missing_columns(records, &options.fields),
        ..Default::default()
    };

    let cases: Vec<ClassifiedCase> = records
        .iter()
        .filter_map(|record| classify_record(record, &options.fields, &mut quality))
        .collect();

    if cases.is_empty() {
        warn!("All {} rows were dropped as incomplete", records.len());
    }

    let (counts, vendor_counts) = aggregate(&cases);
    let recent = recent_open_cases(&cases, options.recent_open_limit);
    let top = top_vendors(&vendor_counts, options.top_vendor_limit);

    info!(
        "Snapshot built: {} cases ({} open, {} ok, {} nok) from {} rows",
        counts.total, counts.open, counts.resolved_ok, counts.resolved_not_ok, quality.rows_seen
    );
    if !quality.is_clean() {
        info!(
            "Data quality: {} dropped, {} bad dates, {} ambiguous dates, {} fallback classifications",
            quality.dropped_rows,
            quality.date_anomalies,
            quality.ambiguous_dates,
            quality.fallback_classifications
        );
    }

    Ok(DashboardSnapshot {
        counts,
        vendor_counts,
        recent_open_cases: recent,
        top_vendors: top,
        quality,
    })
}

/// Transform the provider's result, mapping a structural failure to a batch failure.
pub fn transform_source(
    batch: Result<Vec<RawRecord>, TableError>,
    options: &TransformOptions,
) -> Result<DashboardSnapshot, BatchFailure> {
    match batch {
        Ok(records) => transform(&records, options),
        Err(e) => {
            warn!("Transform skipped: {}", e);
            Err(BatchFailure::Source(e))
        }
    }
}
