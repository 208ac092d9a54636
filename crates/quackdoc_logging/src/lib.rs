#![deny(missing_docs)]
//! Shared logging utilities for the quackdoc workspace.
//!
//! This crate provides the `quack_*` logging macros used across the codebase,
//! a thread-local job label that prefixes every line emitted while a document
//! is being converted, and a minimal test initializer for the global logger.

use std::cell::RefCell;

#[doc(hidden)]
pub use log as __log;

thread_local! {
    /// Label of the conversion job currently running on this thread.
    static JOB_LABEL: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Sets the job label for the current thread, replacing any previous one.
pub fn set_job_label(label: Option<String>) {
    JOB_LABEL.with(|v| *v.borrow_mut() = label);
}

/// Returns the job label for the current thread, if one is set.
pub fn job_label() -> Option<String> {
    JOB_LABEL.with(|v| v.borrow().clone())
}

/// Returns the `[label] ` prefix for log lines, or an empty string.
pub fn job_prefix() -> String {
    JOB_LABEL.with(|v| match v.borrow().as_deref() {
        Some(label) => format!("[{label}] "),
        None => String::new(),
    })
}

/// Scoped job label. Restores the previous label when dropped.
#[must_use = "the label is cleared as soon as the guard is dropped"]
pub struct JobLabelGuard {
    previous: Option<String>,
}

impl JobLabelGuard {
    /// Labels every log line on this thread with `label` until the guard drops.
    pub fn new(label: impl Into<String>) -> Self {
        let previous = job_label();
        set_job_label(Some(label.into()));
        Self { previous }
    }
}

impl Drop for JobLabelGuard {
    fn drop(&mut self) {
        set_job_label(self.previous.take());
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! quack_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! quack_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! quack_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! quack_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! quack_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may already own the global logger.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
