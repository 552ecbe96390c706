//! Shared types and the case classification pipeline for casedesk.
//!
//! Raw spreadsheet rows go in, an immutable `DashboardSnapshot` comes out.

pub mod aggregator;
pub mod case;
pub mod classifier;
pub mod config;
pub mod dates;
pub mod error;
pub mod pipeline;
pub mod ranker;
pub mod record;
pub mod snapshot;
pub mod table;

pub use aggregator::{StatusCounts, VendorCount, VendorCounts};
pub use case::ClassifiedCase;
pub use classifier::{classify, CaseStatus, Classification, ClassificationBasis};
pub use config::{load_config, CasedeskConfig};
pub use error::{BatchFailure, ConfigError, DateParseError, TableError};
pub use pipeline::{transform, transform_source, TransformOptions};
pub use record::{FieldMap, RawRecord};
pub use snapshot::{diff_snapshots, DashboardSnapshot, QualityReport, SnapshotDelta, SnapshotEnvelope};
pub use table::{parse_table, TableDialect};
