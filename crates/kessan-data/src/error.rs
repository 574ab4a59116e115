//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// EDINET API error
    #[error("EDINET API error: {0}")]
    EdinetApi(String),

    /// ZIP archive error
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A record lacks a field it cannot exist without.
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord {
        /// Best available identifier of the rejected record
        record: String,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid date string
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl DataError {
    /// Shorthand for a [`DataError::MalformedRecord`].
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error rejects a single record rather than a whole operation.
    pub const fn is_malformed_record(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
