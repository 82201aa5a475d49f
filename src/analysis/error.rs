use chrono::NaiveDate;
use thiserror::Error;

/// Coarse classification of an [`AnalysisError`], used by the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required date/horizon cell is absent from the table.
    LookupFailure,
    /// A metric was requested over an empty or degenerate series.
    InvalidOperation,
    /// A stored record could not be interpreted.
    InvalidInput,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error("forecast horizon {horizon} for issue {issue} is outside 0..=6")]
    InvalidHorizon { issue: NaiveDate, horizon: i32 },

    #[error("issue {issue} has more than one record for horizon {horizon}")]
    DuplicateHorizon { issue: NaiveDate, horizon: usize },

    #[error("issue {issue} is missing horizons {missing:?}")]
    IncompleteIssue { issue: NaiveDate, missing: Vec<usize> },

    #[error("no forecast issued on {date} (horizon {horizon})")]
    Lookup { date: NaiveDate, horizon: usize },

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("no forecast records loaded")]
    NoRecords,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::LookupFailure => "lookup_failure",
            ErrorKind::InvalidOperation => "invalid_operation",
            ErrorKind::InvalidInput => "invalid_input",
        }
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::IncompleteIssue { .. } | AnalysisError::Lookup { .. } => {
                ErrorKind::LookupFailure
            }
            AnalysisError::InvalidOperation(_) | AnalysisError::NoRecords => {
                ErrorKind::InvalidOperation
            }
            AnalysisError::InvalidRecord(_)
            | AnalysisError::InvalidHorizon { .. }
            | AnalysisError::DuplicateHorizon { .. } => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
