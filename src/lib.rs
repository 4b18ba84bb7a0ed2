//! `citylist` merges city lists spread across a directory of mixed-format files into one
//! deduplicated, sorted CSV report.
//!
//! The primary entrypoint is [`pipeline::run`], which:
//!
//! 1. classifies each file in the input directory by extension and decodes it
//!    ([`ingestion::decode_path`]),
//! 2. checks the decoded table's schema against the canonical city schema
//!    ([`ingestion::validate::verify`]) and merges conforming tables into an
//!    [`accumulator::Accumulator`],
//! 3. averages `Population` per `(Name, CountryCode)` ([`processing::aggregate()`]),
//! 4. writes `combined_data_<stamp>.csv` and computes a [`report::RunSummary`].
//!
//! ## What you can ingest
//!
//! **File formats (detected by extension, case-insensitive):**
//!
//! - **Avro**: `.avro` (object container files)
//! - **JSON**: `.json` (array of records, column-oriented object, or newline-delimited records)
//! - **CSV**: `.csv`, `.dat`
//! - **Parquet**: `.parquet`
//!
//! Anything else is skipped and logged.
//!
//! **Canonical schema:** `Name: Utf8`, `CountryCode: Utf8`, `Population: Int64`. A file is merged
//! only if its columns are exactly these (in any order) with exactly these types. CSV and JSON
//! carry no declared types, so their column types are inferred from the values. In every format an
//! integer column with a missing value reads as `Float64`, so such a file does not match.
//!
//! ## Skipped files
//!
//! A file that is not merged never stops the run. It is reported once to an
//! [`ingestion::IngestionObserver`] as an [`ingestion::IngestionEvent`]:
//!
//! - unknown extension → `INFO`
//! - schema mismatch → `INFO`
//! - decode failure → `ERROR`
//!
//! [`ingestion::FileObserver`] writes these as `<timestamp>|<LEVEL>|<message>` lines.
//!
//! ## Example: ingest and aggregate a directory
//!
//! ```no_run
//! use citylist::ingestion::{ingest_directory, StdErrObserver};
//! use citylist::processing::aggregate;
//!
//! # fn main() -> Result<(), citylist::PipelineError> {
//! let outcome = ingest_directory("data/cities", &StdErrObserver)?;
//! let report = aggregate(&outcome.accumulator);
//! for row in report.rows() {
//!     println!("{} ({}): {}", row.name, row.country_code, row.population);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: directory dispatch, format decoders, schema check, event observers
//! - [`accumulator`]: the canonical schema and the merged table
//! - [`processing`]: aggregation plus generic filter/reduce
//! - [`report`]: CSV output and run summary
//! - [`config`] / [`pipeline`]: run options and the end-to-end run
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types

pub mod accumulator;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod types;

pub use error::{IngestionError, IngestionResult, PipelineError, PipelineResult};
