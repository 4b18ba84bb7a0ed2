//! Run configuration: where to read, where to write, and how to stamp file names.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};

/// The `YYYYMMDD_HHMMSS` stamp shared by the report and log file names of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp(String);

impl RunStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self::from_datetime(&Local::now())
    }

    pub fn from_datetime<Tz: TimeZone>(at: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(at.format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Options controlling a pipeline run.
///
/// Use [`Default`] for common cases and override `input_dir`.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Directory whose files are ingested (not recursive).
    pub input_dir: PathBuf,
    /// Directory for the report; the working directory if `None`.
    pub output_dir: Option<PathBuf>,
    /// Directory for the event log; the working directory if `None`.
    pub error_dir: Option<PathBuf>,
    /// Stamp used in output file names.
    pub stamp: RunStamp,
    /// Also echo ingestion events to stderr.
    pub echo_events: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: None,
            error_dir: None,
            stamp: RunStamp::now(),
            echo_events: false,
        }
    }
}

impl PipelineOptions {
    /// `<output_dir>/combined_data_<stamp>.csv`
    pub fn output_path(&self) -> PathBuf {
        dir_or_cwd(self.output_dir.as_deref()).join(format!("combined_data_{}.csv", self.stamp))
    }

    /// `<error_dir>/file_errors_<stamp>.log`
    pub fn log_path(&self) -> PathBuf {
        dir_or_cwd(self.error_dir.as_deref()).join(format!("file_errors_{}.log", self.stamp))
    }
}

fn dir_or_cwd(dir: Option<&Path>) -> PathBuf {
    dir.map(Path::to_path_buf).unwrap_or_default()
}
