//! Communication-date parsing.
//!
//! The export has emitted both `DD/MM/YYYY` and `MM/DD/YYYY` across sheet
//! revisions without any locale tag. Readings default to day-first and only
//! switch to month-first when the day-first reading is impossible for the
//! month slot. Readings where both orders are valid are flagged as ambiguous.

use crate::error::DateParseError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Date reported for empty and unparseable inputs.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Formats tried when the input is not a three-part slash date.
const FALLBACK_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d.%m.%Y"];

const FALLBACK_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Which convention produced a slash-date reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    DayFirst,
    MonthFirst,
    /// Not a slash date; read by a generic format.
    Generic,
    /// Empty input mapped to the epoch.
    Empty,
}

/// A successfully parsed communication date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateReading {
    pub date: NaiveDate,
    pub order: DateOrder,
    /// Both day-first and month-first were valid and gave different dates.
    pub ambiguous: bool,
}

impl DateReading {
    fn new(date: NaiveDate, order: DateOrder) -> Self {
        Self {
            date,
            order,
            ambiguous: false,
        }
    }
}

/// Parse a communication date, disambiguating day/month order.
pub fn parse_communication_date(raw: &str) -> Result<DateReading, DateParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DateReading::new(epoch(), DateOrder::Empty));
    }

    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() == 3 {
        if let Some((a, b, c)) = numeric_parts(&parts) {
            return parse_slash_date(raw, a, b, c);
        }
    }

    parse_generic(raw)
}

fn numeric_parts(parts: &[&str]) -> Option<(u32, u32, i32)> {
    let a = parts[0].trim().parse::<u32>().ok()?;
    let b = parts[1].trim().parse::<u32>().ok()?;
    // Sheets sometimes append a time to the year: "25/12/2025 10:30"
    let year = parts[2].split_whitespace().next()?.parse::<i32>().ok()?;
    Some((a, b, year))
}

fn parse_slash_date(raw: &str, a: u32, b: u32, year: i32) -> Result<DateReading, DateParseError> {
    let year = expand_year(year);

    let (month, day, order) = if b > 12 && a <= 12 {
        (a, b, DateOrder::MonthFirst)
    } else {
        (b, a, DateOrder::DayFirst)
    };

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        DateParseError::new(raw, format!("no such date: year {} month {} day {}", year, month, day))
    })?;

    Ok(DateReading {
        date,
        order,
        ambiguous: a <= 12 && b <= 12 && a != b,
    })
}

/// Two-digit years land in the 1900s, as the source spreadsheet reads them.
fn expand_year(year: i32) -> i32 {
    if (0..100).contains(&year) {
        1900 + year
    } else {
        year
    }
}

fn parse_generic(raw: &str) -> Result<DateReading, DateParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(DateReading::new(dt.date_naive(), DateOrder::Generic));
    }

    for format in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateReading::new(dt.date(), DateOrder::Generic));
        }
    }

    for format in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(DateReading::new(date, DateOrder::Generic));
        }
    }

    Err(DateParseError::new(raw, "no known date format matched"))
}
