//! Raw source rows and logical field extraction.
//!
//! The export's column names drift between sheet revisions, so every logical
//! field is resolved through an ordered list of candidate column names. A
//! missing column is a normal condition and simply yields `None`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One untyped row of the source table: column name -> raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    fields: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for fixtures.
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.fields.insert(column.to_string(), value.to_string());
        self
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Logical fields the pipeline needs from every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Id,
    Date,
    State,
    OkFlag,
    Vendor,
    Reason,
}

impl LogicalField {
    pub const ALL: [LogicalField; 6] = [
        LogicalField::Id,
        LogicalField::Date,
        LogicalField::State,
        LogicalField::OkFlag,
        LogicalField::Vendor,
        LogicalField::Reason,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Id => "id",
            LogicalField::Date => "date",
            LogicalField::State => "state",
            LogicalField::OkFlag => "ok_flag",
            LogicalField::Vendor => "vendor",
            LogicalField::Reason => "reason",
        }
    }
}

fn default_id_columns() -> Vec<String> {
    vec!["Nº".to_string()]
}

fn default_date_columns() -> Vec<String> {
    vec!["Data comunicação".to_string()]
}

fn default_state_columns() -> Vec<String> {
    vec!["Estado".to_string()]
}

fn default_ok_flag_columns() -> Vec<String> {
    // Both spellings have shipped in different sheet revisions
    vec!["Ok/NO".to_string(), "OK/NOK".to_string()]
}

fn default_vendor_columns() -> Vec<String> {
    vec!["Fornecedor".to_string()]
}

fn default_reason_columns() -> Vec<String> {
    vec!["Motivo".to_string()]
}

/// Column-name mapping: logical field -> candidate columns, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    #[serde(default = "default_id_columns")]
    pub id: Vec<String>,

    #[serde(default = "default_date_columns")]
    pub date: Vec<String>,

    #[serde(default = "default_state_columns")]
    pub state: Vec<String>,

    #[serde(default = "default_ok_flag_columns")]
    pub ok_flag: Vec<String>,

    #[serde(default = "default_vendor_columns")]
    pub vendor: Vec<String>,

    #[serde(default = "default_reason_columns")]
    pub reason: Vec<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: default_id_columns(),
            date: default_date_columns(),
            state: default_state_columns(),
            ok_flag: default_ok_flag_columns(),
            vendor: default_vendor_columns(),
            reason: default_reason_columns(),
        }
    }
}

impl FieldMap {
    pub fn candidates(&self, field: LogicalField) -> &[String] {
        match field {
            LogicalField::Id => &self.id,
            LogicalField::Date => &self.date,
            LogicalField::State => &self.state,
            LogicalField::OkFlag => &self.ok_flag,
            LogicalField::Vendor => &self.vendor,
            LogicalField::Reason => &self.reason,
        }
    }

    /// Resolve one logical field: first candidate column with a non-blank value.
    pub fn resolve<'a>(&self, record: &'a RawRecord, field: LogicalField) -> Option<&'a str> {
        self.candidates(field)
            .iter()
            .filter_map(|column| record.get(column))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Resolve every logical field of a record.
    pub fn extract<'a>(&self, record: &'a RawRecord) -> ExtractedFields<'a> {
        ExtractedFields {
            id: self.resolve(record, LogicalField::Id),
            date: self.resolve(record, LogicalField::Date),
            state: self.resolve(record, LogicalField::State),
            ok_flag: self.resolve(record, LogicalField::OkFlag),
            vendor: self.resolve(record, LogicalField::Vendor),
            reason: self.resolve(record, LogicalField::Reason),
        }
    }

    /// Logical fields with no candidate present among the given header columns.
    pub fn missing_columns(&self, header: &[&str]) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|field| {
                !self
                    .candidates(*field)
                    .iter()
                    .any(|c| header.contains(&c.as_str()))
            })
            .collect()
    }
}

/// Trimmed field values borrowed from a record; `None` means absent or blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractedFields<'a> {
    pub id: Option<&'a str>,
    pub date: Option<&'a str>,
    pub state: Option<&'a str>,
    pub ok_flag: Option<&'a str>,
    pub vendor: Option<&'a str>,
    pub reason: Option<&'a str>,
}

impl<'a> ExtractedFields<'a> {
    /// Id, date and state are all required for a row to become a case.
    pub fn required(&self) -> Option<(&'a str, &'a str, &'a str)> {
        match (self.id, self.date, self.state) {
            (Some(id), Some(date), Some(state)) => Some((id, date, state)),
            _ => None,
        }
    }

    /// Names of the required fields that are missing.
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            (LogicalField::Id, self.id),
            (LogicalField::Date, self.date),
            (LogicalField::State, self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| field.as_str())
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawRecord {
        RawRecord::new()
            .with("Nº", " 17 ")
            .with("Data comunicação", "25/12/2025")
            .with("Estado", "Aberto")
            .with("Fornecedor", "  ")
    }

    #[test]
    fn test_extract_trims_and_blanks_are_absent() {
        let map = FieldMap::default();
        let record = sample();
        let fields = map.extract(&record);
        assert_eq!(fields.id, Some("17"));
        assert_eq!(fields.date, Some("25/12/2025"));
        assert_eq!(fields.vendor, None);
        assert_eq!(fields.reason, None);
        assert_eq!(fields.ok_flag, None);
    }

    #[test]
    fn test_candidates_tried_in_order() {
        let map = FieldMap::default();
        let record = RawRecord::new().with("Ok/NO", "").with("OK/NOK", "nok");
        assert_eq!(map.resolve(&record, LogicalField::OkFlag), Some("nok"));

        let record = RawRecord::new().with("Ok/NO", "OK").with("OK/NOK", "nok");
        assert_eq!(map.resolve(&record, LogicalField::OkFlag), Some("OK"));
    }

    #[test]
    fn test_column_match_is_case_sensitive() {
        let map = FieldMap::default();
        let record = RawRecord::new().with("estado", "aberto");
        assert_eq!(map.resolve(&record, LogicalField::State), None);
    }

    #[test]
    fn test_required_and_missing() {
        let map = FieldMap::default();
        let record = RawRecord::new().with("Nº", "1").with("Estado", "fechado");
        let fields = map.extract(&record);
        assert!(fields.required().is_none());
        assert_eq!(fields.missing_required(), vec!["date"]);

        let record = sample();
        assert_eq!(map.extract(&record).required(), Some(("17", "25/12/2025", "Aberto")));
    }

    #[test]
    fn test_missing_columns_from_header() {
        let map = FieldMap::default();
        let header = ["Nº", "Data comunicação", "Estado", "OK/NOK"];
        let missing = map.missing_columns(&header);
        assert_eq!(missing, vec![LogicalField::Vendor, LogicalField::Reason]);
    }

    #[test]
    fn test_record_from_iter() {
        let record: RawRecord = vec![("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("b"), Some("2"));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
