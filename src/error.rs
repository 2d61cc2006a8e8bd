//! Error types for provenance-db
//!
//! Every failure propagates straight to the caller. Nothing is retried.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// provenance-db error types
#[derive(Error, Debug)]
pub enum Error {
    /// Backing file unreadable or unwritable
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding/decoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failure (metadata export)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Table was never initialized
    #[error("Table '{table}' not found at {path}\nCall ensure_initialized() before loading")]
    TableNotFound {
        /// Table name
        table: &'static str,
        /// Expected location of the backing file
        path: String,
    },

    /// A stored row has the wrong shape or an unparseable value
    #[error("Malformed row in table '{table}' at line {line}: {reason}")]
    MalformedRow {
        /// Table name
        table: &'static str,
        /// 1-based line number in the backing file (0 for rows not yet written)
        line: u64,
        /// What was wrong with the row
        reason: String,
    },

    /// Header row does not match the configured schema
    #[error("Schema mismatch in table '{table}': expected header [{expected}], found [{found}]")]
    SchemaMismatch {
        /// Table name
        table: &'static str,
        /// Header the store is configured for
        expected: String,
        /// Header found on disk, or the record variant being appended
        found: String,
    },

    /// License key outside the enumerated set
    #[error("Invalid license key '{0}'. Choose from: CC-BY, CC-BY-SA, MIT, GPL-3.0, Apache-2.0")]
    InvalidLicense(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
