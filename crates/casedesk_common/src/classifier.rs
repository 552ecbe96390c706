//! Case status classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// State value that marks a case as still open.
pub const OPEN_STATE: &str = "aberto";
/// Confirmation flag values.
pub const FLAG_OK: &str = "ok";
pub const FLAG_NOT_OK: &str = "nok";

/// Status of a complaint case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Open,
    ResolvedOk,
    ResolvedNotOk,
    /// Initial value only; `classify` never returns it.
    #[default]
    Unknown,
}

impl CaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Open => "open",
            CaseStatus::ResolvedOk => "resolved_ok",
            CaseStatus::ResolvedNotOk => "resolved_not_ok",
            CaseStatus::Unknown => "unknown",
        }
    }

    /// Short label used by the dashboard table.
    pub fn label(&self) -> &'static str {
        match self {
            CaseStatus::Open => "Aberto",
            CaseStatus::ResolvedOk => "OK",
            CaseStatus::ResolvedNotOk => "NOK",
            CaseStatus::Unknown => "Desconhecido",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a status was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationBasis {
    OpenState,
    ConfirmedOk,
    ConfirmedNotOk,
    /// Not open and no ok/nok confirmation: presumed not ok.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: CaseStatus,
    pub basis: ClassificationBasis,
}

impl Classification {
    pub fn is_fallback(&self) -> bool {
        self.basis == ClassificationBasis::Fallback
    }
}

/// Classify a case from its state and ok/nok flag.
///
/// Both inputs must already be trimmed and lower-cased; an absent flag is
/// passed as the empty string. Total over all inputs.
pub fn classify(state: &str, ok_flag: &str) -> Classification {
    let (status, basis) = if state == OPEN_STATE {
        (CaseStatus::Open, ClassificationBasis::OpenState)
    } else if ok_flag == FLAG_OK {
        (CaseStatus::ResolvedOk, ClassificationBasis::ConfirmedOk)
    } else if ok_flag == FLAG_NOT_OK {
        (CaseStatus::ResolvedNotOk, ClassificationBasis::ConfirmedNotOk)
    } else {
        (CaseStatus::ResolvedNotOk, ClassificationBasis::Fallback)
    };
    Classification { status, basis }
}

/// Trim and lower-case a raw field for `classify`.
pub fn normalize(raw: Option<&str>) -> String {
    raw.map(|value| value.trim().to_lowercase()).unwrap_or_default()
}
