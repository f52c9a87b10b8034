//! Error types for evostat operations.
//!
//! Ingestion and typing failures are fatal for the log being processed.
//! Missing data inside an aggregate is never an error; it is carried as
//! `None` through the outputs instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::Column;

/// Result type for evostat operations.
pub type Result<T> = std::result::Result<T, EvostatError>;

/// Errors that can occur while reading and aggregating an experiment log.
#[derive(Error, Debug)]
pub enum EvostatError {
    /// A value could not be coerced to its column's declared type.
    /// The whole batch containing it is rejected.
    #[error("Malformed record at row {row}, column '{column}': cannot parse {value:?}")]
    MalformedRecord {
        row: u64,
        column: Column,
        value: String,
    },

    /// The table header does not name a column the schema requires.
    #[error("Missing column in table header: '{0}'")]
    MissingColumn(Column),

    /// A record references an algorithm the header does not declare.
    #[error("Unknown algorithm index {index} (roster has {roster_len} entries)")]
    UnknownAlgorithmIndex { index: usize, roster_len: usize },

    /// The JSON header is absent, malformed or missing expected keys.
    #[error("Missing metadata: {0}")]
    MissingMetadata(String),

    /// Rosters are not ordered identically across elitism policies.
    #[error("Cannot align algorithms across elitism policies: {0}")]
    AlignmentPrecondition(String),

    /// Processing was cancelled between two batches.
    #[error("Processing cancelled")]
    Cancelled,

    /// I/O errors (wrapped).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer errors (wrapped).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON errors (wrapped).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any of the above, attributed to a log file.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<EvostatError>,
    },
}

// Convenience constructors
impl EvostatError {
    pub fn missing_metadata(reason: impl Into<String>) -> Self {
        EvostatError::MissingMetadata(reason.into())
    }

    pub fn malformed(row: u64, column: Column, value: impl Into<String>) -> Self {
        EvostatError::MalformedRecord {
            row,
            column,
            value: value.into(),
        }
    }

    /// Attach the log path, unless one is already attached.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            already @ EvostatError::InFile { .. } => already,
            other => EvostatError::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }

    /// The error without any file attribution.
    pub fn root(&self) -> &EvostatError {
        match self {
            EvostatError::InFile { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error came from a cancellation request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), EvostatError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_names_row_and_column() {
        let err = EvostatError::malformed(7, Column::Iteration, "NaN_invalid");
        let msg = err.to_string();
        assert!(msg.contains("row 7"));
        assert!(msg.contains("'iteration'"));
        assert!(msg.contains("NaN_invalid"));
    }

    #[test]
    fn file_attribution_is_applied_once() {
        let err = EvostatError::Cancelled.in_file("a.csv").in_file("b.csv");
        match &err {
            EvostatError::InFile { path, .. } => assert_eq!(path, &PathBuf::from("a.csv")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.is_cancelled());
        assert!(err.to_string().starts_with("a.csv"));
    }
}
