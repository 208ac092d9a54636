//! quackdoc core: pure conversion domain (formats, config, arguments, metrics, attempt states).
mod arguments;
mod config;
mod format;
mod metrics;
mod state;
mod task;

pub use arguments::build_arguments;
pub use config::{
    BackendKind, ConfigError, ConversionConfig, ExecutionConfig, HeadingStyle, MetricsConfig,
    PandocOptions, RetryPolicy, ValidationConfig, WrapMode, MAX_SECONDS,
};
pub use format::{ConversionDirection, DocFormat};
pub use metrics::{MetricsSnapshot, MetricsTracker, SizeRecord, TimingRecord};
pub use state::{advance, AttemptEvent, AttemptState};
pub use task::{BatchOutcome, ConversionOutcome, ConversionTask, FileDescriptor};
