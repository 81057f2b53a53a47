//! Error handling for the explorer.
//!
//! Typed failures are `thiserror` variants; they travel through the crate
//! inside `anyhow::Error` so I/O boundaries can attach context.

pub mod util;

use std::path::PathBuf;

/// Failure kinds raised by the stores, the filter layer and the
/// interaction layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A store file or directory is missing or unreadable. Fatal at startup.
    #[error("Store unavailable at {path}: {reason}")]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A table required by the query layer was not loaded
    #[error("Table '{table}' is not present in the relational store")]
    MissingTable { table: String },

    /// A column was not found in a record batch
    #[error("Column '{column}' not found")]
    ColumnNotFound { column: String },

    /// A column does not have the expected Arrow type
    #[error("Column '{column}' is not a {expected} array")]
    InvalidDataType { column: String, expected: String },

    /// The drug poisoning document could not be parsed
    #[error("Malformed document {path}: {reason}")]
    MalformedDocument { path: PathBuf, reason: String },

    /// A filter expression could not be evaluated
    #[error("Filter error: {0}")]
    Filter(String),

    /// A user parameter lies outside the discovered domain
    #[error("'{value}' is not a valid {parameter}")]
    ParameterOutOfRange { parameter: String, value: String },
}

impl Error {
    /// Build a `StoreUnavailable` error for a path
    pub fn store_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Build a `ParameterOutOfRange` error
    pub fn out_of_range(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::ParameterOutOfRange {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }
}

/// Result type used throughout the crate
pub type Result<T> = anyhow::Result<T>;

/// True when `err` carries a `ParameterOutOfRange`
#[must_use]
pub fn is_out_of_range(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ParameterOutOfRange { .. })
    )
}
