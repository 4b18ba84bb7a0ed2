//! End-to-end run: ingest a directory, aggregate, write the report, summarize.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::PipelineOptions;
use crate::error::{IngestionError, PipelineError, PipelineResult};
use crate::ingestion::{ingest_directory, CompositeObserver, FileObserver, IngestionObserver, StdErrObserver};
use crate::processing::{aggregate, SortedReport};
use crate::report::{emit, summarize, RunSummary};

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Path of the written CSV report.
    pub output_path: PathBuf,
    /// Path of the event log, when the run wrote one.
    pub log_path: Option<PathBuf>,
    /// Time spent listing, decoding and merging input files.
    pub load_elapsed: Duration,
    pub files_merged: usize,
    pub files_skipped: usize,
    pub summary: RunSummary,
}

/// Run the pipeline, logging skip events to `file_errors_<stamp>.log`.
///
/// With [`PipelineOptions::echo_events`] set, events are also echoed to stderr.
pub fn run(options: &PipelineOptions) -> PipelineResult<RunReport> {
    let log_path = options.log_path();
    let file_observer = FileObserver::create(&log_path).unwrap_or_else(|err| {
        tracing::warn!(path = %log_path.display(), error = %err, "cannot create event log");
        FileObserver::new(&log_path)
    });

    let mut observers: Vec<Arc<dyn IngestionObserver>> = vec![Arc::new(file_observer)];
    if options.echo_events {
        observers.push(Arc::new(StdErrObserver));
    }
    let observer = CompositeObserver::new(observers);

    let mut report = run_with_observer(options, &observer)?;
    report.log_path = Some(log_path);
    Ok(report)
}

/// Run the pipeline, reporting skip events to `observer` only.
pub fn run_with_observer(
    options: &PipelineOptions,
    observer: &dyn IngestionObserver,
) -> PipelineResult<RunReport> {
    let load_start = Instant::now();
    let outcome = ingest_directory(&options.input_dir, observer)?;
    let load_elapsed = load_start.elapsed();

    let report = aggregate(&outcome.accumulator);

    let output_path = options.output_path();
    write_report(&report, &output_path)?;

    let summary = summarize(&outcome.accumulator, &report);
    tracing::info!(
        output = %output_path.display(),
        rows = summary.total_rows,
        unique = summary.unique_rows,
        "report written"
    );

    Ok(RunReport {
        output_path,
        log_path: None,
        load_elapsed,
        files_merged: outcome.files_merged,
        files_skipped: outcome.files_skipped,
        summary,
    })
}

fn write_report(report: &SortedReport, path: &Path) -> PipelineResult<()> {
    let output_error = |source: IngestionError| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| output_error(e.into()))?;
    }
    emit(report, path).map_err(output_error)
}
