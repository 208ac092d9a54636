use std::path::{Path, PathBuf};

use quackdoc_core::BatchOutcome;
use quackdoc_logging::quack_info;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the batch outcome, metrics and per-file results included, as pretty JSON.
pub fn write_batch_report(
    dir: &Path,
    file_name: &str,
    outcome: &BatchOutcome,
) -> Result<PathBuf, ReportError> {
    let mut json = serde_json::to_string_pretty(outcome)?;
    json.push('\n');
    let path = AtomicFileWriter::new(dir.to_path_buf()).write(file_name, &json)?;
    quack_info!("batch report written to {}", path.display());
    Ok(path)
}
