use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::ingestion::IngestionFormat;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for whole-run operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Error type returned by the per-format decoders.
///
/// This is a single error enum shared across Avro/JSON/CSV/Parquet ingestion.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON ingestion error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parquet ingestion error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Avro ingestion error.
    #[error("avro error: {0}")]
    Avro(#[from] apache_avro::Error),

    /// The input is readable but not shaped like a table of the expected format.
    #[error("malformed input: {message}")]
    Malformed { message: String },

    /// The input declares a column type that has no [`crate::types::DataType`] equivalent.
    #[error("unsupported type for column '{column}': {type_name}")]
    UnsupportedType { column: String, type_name: String },

    /// A table does not conform to the schema it is being merged into.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

/// Coarse classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeFailureKind {
    /// The content does not parse as the format implied by the extension.
    NotThisFormat,
    /// The file could not be read.
    IoFailure,
    /// Any other decode-time error.
    Other,
}

/// A decoder's failure outcome: what went wrong, for which format, and why.
#[derive(Debug)]
pub struct DecodeFailure {
    /// Failure classification.
    pub kind: DecodeFailureKind,
    /// Format the decoder was attempting.
    pub format: IngestionFormat,
    /// Underlying cause.
    pub error: IngestionError,
}

impl DecodeFailure {
    pub fn new(kind: DecodeFailureKind, format: IngestionFormat, error: IngestionError) -> Self {
        Self { kind, format, error }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}): {}", self.kind, self.format.label(), self.error)
    }
}

impl std::error::Error for DecodeFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors that terminate a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input directory is missing, not a directory, or unreadable.
    #[error("cannot read input directory {}: {source}", path.display())]
    InputPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report or its destination directory could not be written.
    #[error("cannot write report {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: IngestionError,
    },
}
