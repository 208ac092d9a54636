use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSnapshot;
use crate::DocFormat;

/// Snapshot of an input file taken before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    pub format: DocFormat,
    pub size_bytes: u64,
    pub modified: Option<DateTime<Utc>>,
    /// Tool arguments attached to this file, appended after the configured ones.
    pub extra_args: Vec<String>,
}

impl FileDescriptor {
    /// Display key used for metrics and logs.
    pub fn key(&self) -> String {
        self.path.display().to_string()
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }
}

/// One unit of batch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: FileDescriptor,
    pub target_format: DocFormat,
    pub output_path: Option<PathBuf>,
}

impl ConversionTask {
    pub fn new(source: FileDescriptor, target_format: DocFormat) -> Self {
        Self {
            source,
            target_format,
            output_path: None,
        }
    }

    pub fn with_output(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Output path: `output_dir/<stem>.<ext>` when a directory override is given,
    /// else the explicit output path, else the source with the target extension.
    pub fn resolve_output(&self, output_dir: Option<&Path>) -> PathBuf {
        let ext = self.target_format.extension();
        if let Some(dir) = output_dir {
            let stem = self
                .source
                .path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string());
            return dir.join(format!("{stem}.{ext}"));
        }
        match &self.output_path {
            Some(path) => path.clone(),
            None => self.source.path.with_extension(ext),
        }
    }
}

/// Result of converting one file. Produced exactly once per task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionOutcome {
    pub success: bool,
    pub output_path: Option<PathBuf>,
    pub source_format: Option<DocFormat>,
    pub target_format: Option<DocFormat>,
    pub conversion_time_seconds: Option<f64>,
    pub input_size: Option<u64>,
    pub output_size: Option<u64>,
    pub validation_errors: Vec<String>,
    pub warnings: Vec<String>,
    pub attempts: u32,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl ConversionOutcome {
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            message: Some(error.clone()),
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub success: bool,
    /// Output paths of the converted files, in task order.
    pub succeeded: Vec<PathBuf>,
    /// Input paths that could not be converted, in task order.
    pub failed: Vec<PathBuf>,
    pub metrics: MetricsSnapshot,
    pub outcomes: Vec<ConversionOutcome>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl BatchOutcome {
    /// Builds the aggregate from per-task `(input, outcome)` pairs in task order.
    pub fn from_outcomes(
        results: Vec<(PathBuf, ConversionOutcome)>,
        metrics: MetricsSnapshot,
    ) -> Self {
        let total = results.len();
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut outcomes = Vec::with_capacity(total);
        for (input, outcome) in results {
            match (&outcome.output_path, outcome.success) {
                (Some(out), true) => succeeded.push(out.clone()),
                _ => failed.push(input),
            }
            outcomes.push(outcome);
        }

        let ok = succeeded.len();
        let bad = failed.len();
        let message = if total == 0 {
            "No files to convert".to_string()
        } else if bad == 0 {
            format!("Successfully converted {ok} files")
        } else if ok == 0 {
            format!("All {total} conversions failed")
        } else {
            format!("Partially successful: converted {ok} of {total} files ({bad} failed)")
        };
        let error = (bad > 0).then(|| format!("Failed to convert {bad} of {total} files"));

        Self {
            success: bad == 0,
            succeeded,
            failed,
            metrics,
            outcomes,
            message: Some(message),
            error,
        }
    }
}
