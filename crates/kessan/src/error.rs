//! Error types for store operations.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur while reading or writing a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be read back
    #[error("Corrupt {column} value {value:?}")]
    Corrupt {
        /// Column holding the value
        column: &'static str,
        /// The stored text
        value: String,
    },
}
