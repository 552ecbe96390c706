//! Error types for casedesk.

use thiserror::Error;

/// Structural failure while decoding a delimiter-separated export.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Missing header row (expected at line {line})")]
    MissingHeader { line: usize },

    #[error("Unterminated quoted field at line {line}")]
    UnterminatedQuote { line: usize },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl TableError {
    pub fn code(&self) -> i32 {
        match self {
            TableError::MissingHeader { .. } => -33001,
            TableError::UnterminatedQuote { .. } => -33002,
            TableError::FieldCount { .. } => -33003,
        }
    }
}

/// A date string that none of the known conventions could read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unparseable date '{raw}': {reason}")]
pub struct DateParseError {
    pub raw: String,
    pub reason: String,
}

impl DateParseError {
    pub fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> i32 {
        -33100
    }
}

/// Batch-level failure of a pipeline run. Callers keep their previous snapshot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchFailure {
    #[error("Source returned no rows")]
    EmptyBatch,

    #[error("Source table could not be parsed: {0}")]
    Source(#[from] TableError),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl BatchFailure {
    pub fn code(&self) -> i32 {
        match self {
            BatchFailure::EmptyBatch => -33200,
            BatchFailure::Source(e) => e.code(),
            BatchFailure::Unavailable(_) => -33201,
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> i32 {
        match self {
            ConfigError::Io { .. } => -33300,
            ConfigError::Parse { .. } => -33301,
            ConfigError::Invalid(_) => -33302,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failure_code_forwards_table_error() {
        let err = BatchFailure::from(TableError::UnterminatedQuote { line: 4 });
        assert_eq!(err.code(), -33002);
        assert!(err.to_string().contains("line 4"));
    }

    #[test]
    fn test_empty_batch_message() {
        assert_eq!(BatchFailure::EmptyBatch.to_string(), "Source returned no rows");
    }
}
