//! Unified decode entrypoint.
//!
//! [`IngestionFormat::from_file_name`] classifies a file by its extension and [`decode_path`]
//! runs the matching decoder. Decoders never panic or abort the run: every failure comes back as
//! a [`DecodeFailure`] whose [`DecodeFailureKind`] tells the caller how to report it.

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;

use crate::error::{DecodeFailure, DecodeFailureKind, IngestionError};
use crate::types::CandidateTable;

use super::{avro, csv, json, parquet};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngestionFormat {
    /// Apache Avro object container file.
    Avro,
    /// JSON records (array, column-oriented object, or newline-delimited).
    Json,
    /// Comma-separated values (`.csv` and `.dat`).
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl IngestionFormat {
    /// Parse an ingestion format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "avro" => Some(Self::Avro),
            "json" => Some(Self::Json),
            "csv" | "dat" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Classify a file name by its extension.
    ///
    /// See [`extension_of`] for how the extension is derived.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        Self::from_extension(extension_of(file_name))
    }

    /// Human-readable label used in log messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Avro => "Avro",
            Self::Json => "Json",
            Self::Csv => "CSV/DAT",
            Self::Parquet => "Parquet",
        }
    }
}

impl fmt::Display for IngestionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The text after the final `.` of `file_name`.
///
/// A name without any dot is its own extension, so `README` yields `README`.
pub fn extension_of(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(_, ext)| ext)
}

/// Decode `path` as `format`.
///
/// On success the returned table carries the file's own schema (declared by the format or
/// inferred from its values); it has not been checked against any target schema yet.
pub fn decode_path(
    path: impl AsRef<Path>,
    format: IngestionFormat,
) -> Result<CandidateTable, DecodeFailure> {
    let path = path.as_ref();
    let result = match format {
        IngestionFormat::Avro => avro::ingest_avro_from_path(path),
        IngestionFormat::Json => json::ingest_json_from_path(path),
        IngestionFormat::Csv => csv::ingest_csv_from_path(path),
        IngestionFormat::Parquet => parquet::ingest_parquet_from_path(path),
    };

    result.map_err(|error| DecodeFailure::new(failure_kind_for_error(&error), format, error))
}

/// Classify an [`IngestionError`] raised while decoding.
pub fn failure_kind_for_error(e: &IngestionError) -> DecodeFailureKind {
    match e {
        IngestionError::Io(_) => DecodeFailureKind::IoFailure,
        IngestionError::Malformed { .. } => DecodeFailureKind::NotThisFormat,
        IngestionError::Json(err) => match err.classify() {
            serde_json::error::Category::Io => DecodeFailureKind::IoFailure,
            _ => DecodeFailureKind::NotThisFormat,
        },
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => DecodeFailureKind::IoFailure,
            ::csv::ErrorKind::Utf8 { .. } | ::csv::ErrorKind::UnequalLengths { .. } => {
                DecodeFailureKind::NotThisFormat
            }
            _ => DecodeFailureKind::Other,
        },
        IngestionError::Parquet(err) => {
            // Parquet errors often wrap IO, but not always in a structured way.
            if error_chain_contains_io(err) {
                DecodeFailureKind::IoFailure
            } else {
                DecodeFailureKind::Other
            }
        }
        IngestionError::Avro(err) => {
            if error_chain_contains_io(err) {
                DecodeFailureKind::IoFailure
            } else {
                DecodeFailureKind::Other
            }
        }
        IngestionError::UnsupportedType { .. }
        | IngestionError::SchemaMismatch { .. }
        | IngestionError::ParseError { .. } => DecodeFailureKind::Other,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}
