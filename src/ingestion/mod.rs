//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest_directory`] (from [`dispatcher`]) which:
//!
//! - classifies each file in a directory by extension
//! - decodes it with the matching format decoder (see [`decode_path`])
//! - checks the decoded schema against the accumulator's (see [`validate`])
//! - merges conforming files and reports every skipped file to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`avro`]
//! - [`csv`]
//! - [`json`]
//! - [`parquet`]

pub mod avro;
pub mod csv;
pub mod dispatcher;
mod infer;
pub mod json;
pub mod observability;
pub mod parquet;
pub mod unified;
pub mod validate;

pub use dispatcher::{ingest_directory, ingest_file, FileOutcome, IngestOutcome};
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionEvent, IngestionObserver, IngestionSeverity,
    IngestionStats, StdErrObserver,
};
pub use unified::{decode_path, extension_of, IngestionFormat};
