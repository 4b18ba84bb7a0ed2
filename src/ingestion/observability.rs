use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;

use crate::error::{DecodeFailure, DecodeFailureKind};

use super::unified::IngestionFormat;

/// Severity of a skip event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// The file was skipped by policy (unknown extension, schema mismatch).
    Info,
    /// The file was skipped because it could not be decoded.
    Error,
}

impl IngestionSeverity {
    /// Upper-case level name used in log lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
        }
    }
}

/// A file that did not contribute rows, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionEvent {
    /// No decoder is mapped to the file's extension.
    UnrecognizedExtension { path: PathBuf },
    /// The decoder for the file's format failed.
    DecodeFailed {
        path: PathBuf,
        format: IngestionFormat,
        kind: DecodeFailureKind,
        cause: String,
    },
    /// The file decoded, but its columns do not match the target schema.
    SchemaMismatch { path: PathBuf, reason: String },
}

impl IngestionEvent {
    pub fn decode_failed(path: impl Into<PathBuf>, failure: &DecodeFailure) -> Self {
        Self::DecodeFailed {
            path: path.into(),
            format: failure.format,
            kind: failure.kind,
            cause: failure.error.to_string(),
        }
    }

    pub fn severity(&self) -> IngestionSeverity {
        match self {
            Self::UnrecognizedExtension { .. } | Self::SchemaMismatch { .. } => IngestionSeverity::Info,
            Self::DecodeFailed { .. } => IngestionSeverity::Error,
        }
    }

    /// The log message for this event.
    pub fn message(&self) -> String {
        match self {
            Self::UnrecognizedExtension { path } => format!(
                "the extension of {} is not defined and thus the data was not processed",
                file_name(path)
            ),
            Self::DecodeFailed {
                path,
                format,
                kind: DecodeFailureKind::NotThisFormat,
                ..
            } => format!("{} is not a {} file", path.display(), format.label()),
            Self::DecodeFailed {
                path, format, cause, ..
            } => format!(
                "An error occurred while loading the {} file {}: {}",
                format.label(),
                path.display(),
                cause
            ),
            Self::SchemaMismatch { path, reason } => format!(
                "{} is not matching the table structure ({reason})",
                file_name(path)
            ),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Context about a merged file.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path that was merged.
    pub path: PathBuf,
    /// Format used for decoding.
    pub format: IngestionFormat,
}

/// Minimal stats reported on a successful merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of merged rows.
    pub rows: usize,
}

/// Observer interface for ingestion outcomes.
///
/// The dispatcher reports every skipped file exactly once through [`Self::on_event`].
/// Merges are reported through [`Self::on_merged`], which implementors may ignore.
pub trait IngestionObserver: Send + Sync {
    /// Called when a file's rows were appended.
    fn on_merged(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when a file was skipped.
    fn on_event(&self, _event: &IngestionEvent) {}
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_merged(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_merged(ctx, stats);
        }
    }

    fn on_event(&self, event: &IngestionEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Echoes ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_merged(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] format={:?} path={} rows={}",
            ctx.format,
            ctx.path.display(),
            stats.rows
        );
    }

    fn on_event(&self, event: &IngestionEvent) {
        eprintln!("[ingest][{}] {}", event.severity().label(), event.message());
    }
}

/// Appends skip events to a local log file as `<timestamp>|<LEVEL>|<message>` lines.
///
/// Merges are not written.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Like [`Self::new`], but creates the parent directory and the (empty) log file up front.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(path))
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_event(&self, event: &IngestionEvent) {
        self.append_line(&format_log_line(&local_ts(), event));
    }
}

/// Render one log line. The message is kept on a single line.
pub fn format_log_line(timestamp: &str, event: &IngestionEvent) -> String {
    let message = event.message().replace(['\r', '\n'], " ");
    format!("{timestamp}|{}|{message}", event.severity().label())
}

fn local_ts() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{format_log_line, IngestionEvent, IngestionSeverity};
    use crate::error::DecodeFailureKind;
    use crate::ingestion::IngestionFormat;

    #[test]
    fn unrecognized_extension_is_info_and_names_the_file() {
        let ev = IngestionEvent::UnrecognizedExtension {
            path: PathBuf::from("/data/in/notes.txt"),
        };
        assert_eq!(ev.severity(), IngestionSeverity::Info);
        assert_eq!(
            ev.message(),
            "the extension of notes.txt is not defined and thus the data was not processed"
        );
    }

    #[test]
    fn not_this_format_message_uses_format_label() {
        let ev = IngestionEvent::DecodeFailed {
            path: PathBuf::from("in/bad.dat"),
            format: IngestionFormat::Csv,
            kind: DecodeFailureKind::NotThisFormat,
            cause: "whatever".to_string(),
        };
        assert_eq!(ev.severity(), IngestionSeverity::Error);
        assert_eq!(ev.message(), "in/bad.dat is not a CSV/DAT file");
    }

    #[test]
    fn other_decode_failures_include_the_cause() {
        let ev = IngestionEvent::DecodeFailed {
            path: PathBuf::from("in/cities.parquet"),
            format: IngestionFormat::Parquet,
            kind: DecodeFailureKind::Other,
            cause: "unsupported type".to_string(),
        };
        assert_eq!(
            ev.message(),
            "An error occurred while loading the Parquet file in/cities.parquet: unsupported type"
        );
    }

    #[test]
    fn log_line_is_pipe_delimited_on_one_line() {
        let ev = IngestionEvent::SchemaMismatch {
            path: PathBuf::from("in/extra.csv"),
            reason: "unexpected column 'District'".to_string(),
        };
        assert_eq!(
            format_log_line("2024-05-01 10:00:00,000", &ev),
            "2024-05-01 10:00:00,000|INFO|extra.csv is not matching the table structure \
             (unexpected column 'District')"
        );

        let multiline = IngestionEvent::DecodeFailed {
            path: PathBuf::from("in/x.json"),
            format: IngestionFormat::Json,
            kind: DecodeFailureKind::IoFailure,
            cause: "line one\nline two".to_string(),
        };
        let line = format_log_line("ts", &multiline);
        assert!(!line.contains('\n'));
        assert!(line.starts_with("ts|ERROR|"));
    }
}
