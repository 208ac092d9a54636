use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use quackdoc_core::DocFormat;

/// Everything that can go wrong while converting one file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("conversion tool unavailable: {0}")]
    Setup(String),
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("input file {} cannot be read: {message}", .path.display())]
    InputUnreadable { path: PathBuf, message: String },
    #[error("unsupported conversion from {from} to {to}")]
    Unsupported { from: DocFormat, to: DocFormat },
    #[error("failed to create output directory {}: {message}", .path.display())]
    DirectoryCreation { path: PathBuf, message: String },
    #[error("conversion tool failed: {0}")]
    Execution(String),
    #[error("conversion tool timed out after {0:?}")]
    Timeout(Duration),
    #[error("output validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl ConvertError {
    /// Tool failures and bad output are worth another attempt; setup and input problems are not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConvertError::Execution(_) | ConvertError::Timeout(_) | ConvertError::Validation(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionEvent {
    Started {
        input: PathBuf,
        target: DocFormat,
    },
    AttemptFailed {
        input: PathBuf,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },
    Finished {
        input: PathBuf,
        success: bool,
        attempts: u32,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ConversionEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ConversionEvent) {}
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<ConversionEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ConversionEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ConversionEvent) {
        let _ = self.tx.send(event);
    }
}
