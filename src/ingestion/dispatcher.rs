//! Directory ingestion: classify, decode, validate, merge.
//!
//! [`ingest_directory`] walks the regular files directly inside a directory (no recursion) and
//! merges every file whose decoded schema matches the accumulator's. Each skipped file is
//! reported to the observer exactly once; the run only fails if the directory itself cannot be
//! read.

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::accumulator::Accumulator;
use crate::error::{PipelineError, PipelineResult};

use super::observability::{IngestionContext, IngestionEvent, IngestionObserver, IngestionStats};
use super::unified::{decode_path, IngestionFormat};
use super::validate::mismatch_reason;

/// Result of ingesting one directory.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// All merged rows.
    pub accumulator: Accumulator,
    /// Files whose rows were appended.
    pub files_merged: usize,
    /// Regular files that contributed nothing.
    pub files_skipped: usize,
}

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    Merged { rows: usize },
    Skipped,
}

/// Ingest every regular file directly inside `dir` into a fresh [`Accumulator`].
///
/// Files are visited in file-name order.
pub fn ingest_directory(
    dir: impl AsRef<Path>,
    observer: &dyn IngestionObserver,
) -> PipelineResult<IngestOutcome> {
    let dir = dir.as_ref();
    check_input_dir(dir)?;

    let mut outcome = IngestOutcome {
        accumulator: Accumulator::new(),
        files_merged: 0,
        files_skipped: 0,
    };

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        match ingest_file(entry.path(), &mut outcome.accumulator, observer) {
            FileOutcome::Merged { .. } => outcome.files_merged += 1,
            FileOutcome::Skipped => outcome.files_skipped += 1,
        }
    }

    tracing::debug!(
        dir = %dir.display(),
        merged = outcome.files_merged,
        skipped = outcome.files_skipped,
        rows = outcome.accumulator.row_count(),
        "directory ingested"
    );
    Ok(outcome)
}

fn check_input_dir(dir: &Path) -> PipelineResult<()> {
    let input_path_error = |source: io::Error| PipelineError::InputPath {
        path: dir.to_path_buf(),
        source,
    };

    let meta = fs::metadata(dir).map_err(input_path_error)?;
    if !meta.is_dir() {
        return Err(input_path_error(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }
    fs::read_dir(dir).map_err(input_path_error)?;
    Ok(())
}

/// Classify, decode, validate and (on match) merge a single file.
pub fn ingest_file(
    path: &Path,
    accumulator: &mut Accumulator,
    observer: &dyn IngestionObserver,
) -> FileOutcome {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(format) = IngestionFormat::from_file_name(&file_name) else {
        observer.on_event(&IngestionEvent::UnrecognizedExtension {
            path: path.to_path_buf(),
        });
        return FileOutcome::Skipped;
    };

    let candidate = match decode_path(path, format) {
        Ok(candidate) => candidate,
        Err(failure) => {
            observer.on_event(&IngestionEvent::decode_failed(path, &failure));
            return FileOutcome::Skipped;
        }
    };

    if let Some(reason) = mismatch_reason(accumulator.schema(), &candidate.schema) {
        observer.on_event(&IngestionEvent::SchemaMismatch {
            path: path.to_path_buf(),
            reason,
        });
        return FileOutcome::Skipped;
    }

    match accumulator.append(candidate) {
        Ok(rows) => {
            let ctx = IngestionContext {
                path: path.to_path_buf(),
                format,
            };
            observer.on_merged(&ctx, IngestionStats { rows });
            FileOutcome::Merged { rows }
        }
        Err(err) => {
            observer.on_event(&IngestionEvent::SchemaMismatch {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
            FileOutcome::Skipped
        }
    }
}
