//! Error types for snapshot persistence.

use fleetdb_core::CoreError;
use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while loading or saving snapshots.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The CSV layer failed outside of a specific data row.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header matches no known snapshot layout.
    #[error("unsupported snapshot header: {found}")]
    UnsupportedHeader {
        /// The header line as read.
        found: String,
    },

    /// A data row could not be parsed.
    #[error("malformed row at line {line}: {message}")]
    MalformedRow {
        /// 1-based line number in the snapshot.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },

    /// A parsed row was rejected by the registry.
    #[error("row at line {line} rejected: {source}")]
    Rejected {
        /// 1-based line number in the snapshot.
        line: u64,
        /// Why the registry refused the driver.
        #[source]
        source: CoreError,
    },

    /// A registry-level error outside of any row.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl StorageError {
    /// Line number the error refers to, if it concerns one row.
    #[must_use]
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::MalformedRow { line, .. } | Self::Rejected { line, .. } => Some(*line),
            _ => None,
        }
    }
}
