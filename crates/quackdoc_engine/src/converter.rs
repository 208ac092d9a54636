use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use chrono::Utc;
use quackdoc_core::{
    build_arguments, BackendKind, BatchOutcome, ConversionConfig, ConversionDirection,
    ConversionOutcome, ConversionTask, DocFormat, MetricsSnapshot, MetricsTracker,
};
use quackdoc_logging::{quack_debug, quack_error, quack_info, JobLabelGuard};

use crate::backend::{ExternalConverter, Html2MdBackend};
use crate::executor::ConversionExecutor;
use crate::pandoc::PandocBackend;
use crate::persist::{DirectoryCreator, FileInfoProvider, LocalFs, TextWriter};
use crate::probe::FileProbe;
use crate::retry::{run_with_retry, Exhausted};
use crate::types::{ConversionEvent, NullProgressSink, ProgressSink};
use crate::validate::OutputValidator;
use crate::ConvertError;

/// Everything a converter depends on, passed in explicitly.
#[derive(Clone)]
pub struct ConverterContext {
    pub config: ConversionConfig,
    pub backend: Arc<dyn ExternalConverter>,
    pub files: Arc<dyn FileInfoProvider>,
    pub directories: Arc<dyn DirectoryCreator>,
    pub writer: Arc<dyn TextWriter>,
    pub progress: Arc<dyn ProgressSink>,
}

impl ConverterContext {
    /// Local filesystem and no progress reporting.
    pub fn new(config: ConversionConfig, backend: Arc<dyn ExternalConverter>) -> Self {
        Self {
            config,
            backend,
            files: Arc::new(LocalFs),
            directories: Arc::new(LocalFs),
            writer: Arc::new(LocalFs),
            progress: Arc::new(NullProgressSink),
        }
    }

    /// Picks the backend named by `execution.backend`.
    pub fn from_config(config: ConversionConfig) -> Self {
        let backend: Arc<dyn ExternalConverter> = match config.execution.backend {
            BackendKind::Pandoc => Arc::new(PandocBackend::from_config(&config.execution)),
            BackendKind::Builtin => Arc::new(Html2MdBackend),
        };
        Self::new(config, backend)
    }

    pub fn with_files(mut self, files: Arc<dyn FileInfoProvider>) -> Self {
        self.files = files;
        self
    }

    pub fn with_directories(mut self, directories: Arc<dyn DirectoryCreator>) -> Self {
        self.directories = directories;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn TextWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }
}

/// Converts documents one at a time or in batches, with retries, validation and metrics.
pub struct DocumentConverter {
    ctx: ConverterContext,
    tracker: MetricsTracker,
}

impl DocumentConverter {
    /// Fails when the configuration is unusable or the backend is not installed.
    pub fn new(ctx: ConverterContext) -> Result<Self, ConvertError> {
        ctx.config
            .validate()
            .map_err(|e| ConvertError::Setup(format!("invalid configuration: {e}")))?;
        let version = ctx.backend.check_available()?;
        quack_info!("conversion backend: {version}");
        let tracker = MetricsTracker::new(ctx.config.metrics.clone());
        Ok(Self { ctx, tracker })
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.ctx.config
    }

    /// Statistics since construction or since the last batch started.
    pub fn metrics(&self) -> &MetricsSnapshot {
        self.tracker.snapshot()
    }

    pub fn convert_file(
        &mut self,
        input: &Path,
        output: &Path,
        target: &DocFormat,
    ) -> ConversionOutcome {
        self.convert_file_with_args(input, output, target, &[])
    }

    /// Like [`convert_file`](Self::convert_file), appending `extra_args` to the tool command line.
    pub fn convert_file_with_args(
        &mut self,
        input: &Path,
        output: &Path,
        target: &DocFormat,
        extra_args: &[String],
    ) -> ConversionOutcome {
        let job = Job {
            input,
            format_hint: None,
            output,
            target,
            extra_args,
        };
        convert_one(&self.ctx, &mut self.tracker, &job)
    }

    /// Converts every task and aggregates the results. Metrics are reset first.
    pub fn convert_batch(
        &mut self,
        tasks: &[ConversionTask],
        output_dir: Option<&Path>,
    ) -> BatchOutcome {
        self.tracker.reset();
        let workers = self.ctx.config.execution.workers.clamp(1, tasks.len().max(1));
        quack_info!("converting {} files with {} worker(s)", tasks.len(), workers);

        let results = if workers == 1 {
            tasks
                .iter()
                .map(|task| {
                    let outcome = convert_task(&self.ctx, &mut self.tracker, task, output_dir);
                    (task.source.path.clone(), outcome)
                })
                .collect()
        } else {
            let (results, snapshots) = run_pool(&self.ctx, tasks, output_dir, workers);
            for snapshot in snapshots {
                self.tracker.merge(snapshot);
            }
            results
        };

        let outcome = BatchOutcome::from_outcomes(results, self.tracker.snapshot().clone());
        if let Some(message) = &outcome.message {
            quack_info!("{message}");
        }
        outcome
    }

    /// True when `output` passes validation against `input`'s current size.
    pub fn validate_conversion(&self, output: &Path, input: &Path) -> bool {
        let original_size = self.ctx.files.stat(input).map(|s| s.size).unwrap_or(0);
        let format = DocFormat::from_path(output);
        let report = OutputValidator::new(&self.ctx.config.validation)
            .with_files(self.ctx.files.as_ref())
            .validate(output, input, original_size, &format);
        for error in &report.errors {
            quack_debug!("{}: {error}", output.display());
        }
        report.is_valid()
    }
}

struct Job<'a> {
    input: &'a Path,
    format_hint: Option<&'a DocFormat>,
    output: &'a Path,
    target: &'a DocFormat,
    extra_args: &'a [String],
}

fn convert_task(
    ctx: &ConverterContext,
    tracker: &mut MetricsTracker,
    task: &ConversionTask,
    output_dir: Option<&Path>,
) -> ConversionOutcome {
    let output = task.resolve_output(output_dir);
    let job = Job {
        input: &task.source.path,
        format_hint: Some(&task.source.format),
        output: &output,
        target: &task.target_format,
        extra_args: &task.source.extra_args,
    };
    convert_one(ctx, tracker, &job)
}

enum WorkerMessage {
    Done {
        index: usize,
        outcome: ConversionOutcome,
    },
    Metrics(MetricsSnapshot),
}

/// Workers pull task indices from a shared counter; results come back tagged with their index.
fn run_pool(
    ctx: &ConverterContext,
    tasks: &[ConversionTask],
    output_dir: Option<&Path>,
    workers: usize,
) -> (Vec<(PathBuf, ConversionOutcome)>, Vec<MetricsSnapshot>) {
    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();
    let mut slots: Vec<Option<ConversionOutcome>> = vec![None; tasks.len()];
    let mut snapshots = Vec::with_capacity(workers);

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let metrics = ctx.config.metrics.clone();
            scope.spawn(move || {
                let mut tracker = MetricsTracker::new(metrics);
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(task) = tasks.get(index) else {
                        break;
                    };
                    let outcome = convert_task(ctx, &mut tracker, task, output_dir);
                    if tx.send(WorkerMessage::Done { index, outcome }).is_err() {
                        break;
                    }
                }
                let _ = tx.send(WorkerMessage::Metrics(tracker.into_snapshot()));
            });
        }
        drop(tx);

        for message in rx {
            match message {
                WorkerMessage::Done { index, outcome } => slots[index] = Some(outcome),
                WorkerMessage::Metrics(snapshot) => snapshots.push(snapshot),
            }
        }
    });

    let results = tasks
        .iter()
        .zip(slots)
        .map(|(task, slot)| {
            let outcome = slot.unwrap_or_else(|| {
                ConversionOutcome::failure("worker stopped before converting this file")
            });
            (task.source.path.clone(), outcome)
        })
        .collect();
    (results, snapshots)
}

fn convert_one(
    ctx: &ConverterContext,
    tracker: &mut MetricsTracker,
    job: &Job<'_>,
) -> ConversionOutcome {
    let key = job.input.display().to_string();
    let label = job
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.clone());
    let _label = JobLabelGuard::new(label);

    tracker.begin();
    ctx.progress.emit(ConversionEvent::Started {
        input: job.input.to_path_buf(),
        target: job.target.clone(),
    });

    let start = Utc::now();
    let mut outcome = attempt_conversion(ctx, job, &key);
    let end = Utc::now();
    outcome.conversion_time_seconds = Some((end - start).num_milliseconds() as f64 / 1000.0);

    if outcome.success {
        tracker.record(
            &key,
            start,
            end,
            outcome.input_size.unwrap_or(0),
            outcome.output_size.unwrap_or(0),
        );
        tracker.record_success(&key);
    } else {
        let error = outcome.error.clone().unwrap_or_default();
        quack_error!("{error}");
        tracker.record_failure(&key, error);
    }

    ctx.progress.emit(ConversionEvent::Finished {
        input: job.input.to_path_buf(),
        success: outcome.success,
        attempts: outcome.attempts,
    });
    outcome
}

fn attempt_conversion(
    ctx: &ConverterContext,
    job: &Job<'_>,
    key: &str,
) -> ConversionOutcome {
    let source = match FileProbe::new(ctx.files.as_ref()).probe(job.input, job.format_hint) {
        Ok(source) => source,
        Err(err) => return ConversionOutcome::failure(err.to_string()),
    };

    let mut outcome = ConversionOutcome {
        source_format: Some(source.format.clone()),
        target_format: Some(job.target.clone()),
        input_size: Some(source.size_bytes),
        ..ConversionOutcome::default()
    };

    let Some(direction) = ConversionDirection::resolve(&source.format, job.target) else {
        let err = ConvertError::Unsupported {
            from: source.format.clone(),
            to: job.target.clone(),
        };
        return fail(outcome, err.to_string());
    };

    if let Some(parent) = job.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = ctx.directories.create_dir_all(parent) {
            let err = ConvertError::DirectoryCreation {
                path: parent.to_path_buf(),
                message: e.to_string(),
            };
            return fail(outcome, err.to_string());
        }
    }

    let args = build_arguments(&ctx.config, &source.format, job.target, job.extra_args);
    quack_debug!("{direction} for {key} with {args:?}");

    let executor = ConversionExecutor::new(ctx.backend.as_ref(), ctx.writer.as_ref());
    let validator = OutputValidator::new(&ctx.config.validation).with_files(ctx.files.as_ref());
    let result = run_with_retry(
        &ctx.config.retry_mechanism,
        |_| {
            executor.execute(direction, job.input, job.output, &args)?;
            let report = validator.validate(job.output, job.input, source.size_bytes, job.target);
            if report.is_valid() {
                Ok(report.warnings)
            } else {
                Err(ConvertError::Validation(report.errors))
            }
        },
        |attempt, max_attempts, err| {
            ctx.progress.emit(ConversionEvent::AttemptFailed {
                input: job.input.to_path_buf(),
                attempt,
                max_attempts,
                reason: err.to_string(),
            });
        },
    );

    match result {
        Ok((warnings, attempts)) => {
            outcome.success = true;
            outcome.attempts = attempts;
            outcome.warnings = warnings;
            outcome.output_path = Some(job.output.to_path_buf());
            outcome.output_size = ctx.files.stat(job.output).ok().map(|s| s.size);
            outcome.message = Some(format!(
                "Successfully converted {} to {}",
                job.input.display(),
                job.output.display()
            ));
            outcome
        }
        Err(Exhausted { attempts, error }) => {
            outcome.attempts = attempts;
            if let ConvertError::Validation(errors) = &error {
                outcome.validation_errors = errors.clone();
            }
            let message = format!(
                "Failed to convert {} to {} after {attempts} attempt(s): {error}",
                job.input.display(),
                job.target
            );
            fail(outcome, message)
        }
    }
}

fn fail(mut outcome: ConversionOutcome, error: String) -> ConversionOutcome {
    outcome.success = false;
    outcome.output_path = None;
    outcome.message = Some(error.clone());
    outcome.error = Some(error);
    outcome
}
