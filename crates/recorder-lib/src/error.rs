//! Error types for the recorder
//!
//! Collaborator failures (cluster listing, metric queries) are recovered
//! where they happen and never surface here. These types cover the
//! classification and persistence layers, where some failures indicate
//! schema drift and must stop the process.

use crate::models::ResourceKind;

/// Errors raised while classifying or encoding conditions
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    /// A detected condition is not part of the kind's vocabulary.
    #[error("{kind} condition '{name}' is not in the flag vocabulary")]
    UnknownCondition { kind: ResourceKind, name: String },
}

/// Errors raised by row sinks
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// A row carries a column its table schema does not declare.
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn { table: String, column: String },

    /// Two parts of a table schema produce the same column name.
    #[error("table '{table}' declares column '{column}' twice")]
    DuplicateColumn { table: String, column: String },

    /// Existing output has a different header than the schema.
    #[error("table '{table}' exists with a different column layout")]
    HeaderMismatch { table: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl SinkError {
    /// Whether this error reflects a schema bug rather than an I/O condition
    pub fn is_schema_drift(&self) -> bool {
        matches!(
            self,
            SinkError::UnknownColumn { .. }
                | SinkError::DuplicateColumn { .. }
                | SinkError::HeaderMismatch { .. }
        )
    }
}

/// Top-level error for one recording cycle
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("classification failed: {0}")]
    Classify(#[from] ClassifyError),

    #[error("persisting rows failed: {0}")]
    Sink(#[from] SinkError),
}

impl RecorderError {
    /// Fatal errors stop the scheduler; anything else is logged and the
    /// next cycle proceeds.
    pub fn is_fatal(&self) -> bool {
        match self {
            RecorderError::Classify(_) => true,
            RecorderError::Sink(e) => e.is_schema_drift(),
        }
    }
}

/// Convenience `Result` alias for cycle operations.
pub type Result<T> = std::result::Result<T, RecorderError>;
