use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest delay or timeout accepted by [`ConversionConfig::validate`]: one week.
pub const MAX_SECONDS: f64 = 7.0 * 24.0 * 60.0 * 60.0;

/// Top-level converter configuration. Read-only for the life of a converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    pub pandoc_options: PandocOptions,
    pub validation: ValidationConfig,
    pub retry_mechanism: RetryPolicy,
    pub metrics: MetricsConfig,
    pub html_to_md_extra_args: Vec<String>,
    pub md_to_docx_extra_args: Vec<String>,
    pub output_dir: PathBuf,
    pub execution: ExecutionConfig,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pandoc_options: PandocOptions::default(),
            validation: ValidationConfig::default(),
            retry_mechanism: RetryPolicy::default(),
            metrics: MetricsConfig::default(),
            html_to_md_extra_args: vec![
                "--strip-comments".to_string(),
                "--no-highlight".to_string(),
            ],
            md_to_docx_extra_args: Vec::new(),
            output_dir: PathBuf::from("./output"),
            execution: ExecutionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    #[default]
    None,
    Auto,
    Preserve,
}

impl WrapMode {
    pub fn as_str(self) -> &'static str {
        match self {
            WrapMode::None => "none",
            WrapMode::Auto => "auto",
            WrapMode::Preserve => "preserve",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    #[default]
    Atx,
    Setext,
}

impl HeadingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            HeadingStyle::Atx => "atx",
            HeadingStyle::Setext => "setext",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PandocOptions {
    pub wrap: WrapMode,
    pub standalone: bool,
    pub markdown_headings: HeadingStyle,
    pub reference_links: bool,
    pub resource_path: Vec<PathBuf>,
}

impl Default for PandocOptions {
    fn default() -> Self {
        Self {
            wrap: WrapMode::None,
            standalone: true,
            markdown_headings: HeadingStyle::Atx,
            reference_links: true,
            resource_path: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub verify_structure: bool,
    pub min_file_size: u64,
    pub conversion_ratio_threshold: f64,
    pub check_links: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            verify_structure: true,
            min_file_size: 50,
            conversion_ratio_threshold: 0.1,
            check_links: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included.
    pub max_conversion_retries: u32,
    /// Fixed delay between attempts, in seconds.
    pub conversion_retry_delay: f64,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_conversion_retries.max(1)
    }

    pub fn delay(&self) -> Duration {
        clamped_duration(self.conversion_retry_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_conversion_retries: 3,
            conversion_retry_delay: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub track_conversion_time: bool,
    pub track_file_sizes: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            track_conversion_time: true,
            track_file_sizes: true,
        }
    }
}

/// Which tool performs the actual format transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Pandoc,
    /// In-process html to markdown, no external binary.
    Builtin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    pub backend: BackendKind,
    pub pandoc_path: PathBuf,
    /// Upper bound for one tool invocation, in seconds.
    pub timeout_seconds: f64,
    /// Batch worker count; 1 runs tasks sequentially.
    pub workers: usize,
}

impl ExecutionConfig {
    pub fn timeout(&self) -> Duration {
        clamped_duration(self.timeout_seconds)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Pandoc,
            pandoc_path: PathBuf::from("pandoc"),
            timeout_seconds: 300.0,
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("retry_mechanism.max_conversion_retries must be at least 1")]
    NoAttempts,
    #[error("{field} must be a number of seconds between 0 and 604800 (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },
    #[error("execution.timeout_seconds must be greater than zero")]
    ZeroTimeout,
    #[error("validation.conversion_ratio_threshold must be within [0, 1] (got {0})")]
    RatioOutOfRange(f64),
    #[error("execution.workers must be at least 1")]
    NoWorkers,
}

impl ConversionConfig {
    /// Rejects values the converter cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_mechanism.max_conversion_retries == 0 {
            return Err(ConfigError::NoAttempts);
        }
        check_seconds(
            "retry_mechanism.conversion_retry_delay",
            self.retry_mechanism.conversion_retry_delay,
        )?;
        check_seconds("execution.timeout_seconds", self.execution.timeout_seconds)?;
        if self.execution.timeout_seconds == 0.0 {
            return Err(ConfigError::ZeroTimeout);
        }
        let ratio = self.validation.conversion_ratio_threshold;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::RatioOutOfRange(ratio));
        }
        if self.execution.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }
}

fn check_seconds(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=MAX_SECONDS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDuration { field, value })
    }
}

/// Out-of-range values are clamped into `[0, MAX_SECONDS]`; NaN becomes zero.
fn clamped_duration(seconds: f64) -> Duration {
    if seconds.is_nan() {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(seconds.clamp(0.0, MAX_SECONDS))
}
