//! quackdoc: HTML to Markdown and Markdown to DOCX conversion with validation and retries.
mod config;
mod logging;
mod plan;
mod progress;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use quackdoc_core::{BackendKind, ConversionConfig, ConversionTask, DocFormat};
use quackdoc_engine::{
    probe, write_batch_report, ConverterContext, DocumentConverter, Html2MdBackend,
};
use quackdoc_logging::quack_error;

use crate::progress::StderrProgress;

#[derive(Parser)]
#[command(name = "quackdoc")]
#[command(version)]
#[command(about = "Convert HTML to Markdown and Markdown to DOCX, with output validation")]
struct Cli {
    /// RON configuration file; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Conversion backend, overriding the configuration
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert one file
    Convert {
        input: PathBuf,

        /// Target format
        #[arg(long, value_enum)]
        to: FormatArg,

        /// Output file (default: <output_dir>/<stem>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Extra argument for the conversion tool (repeatable)
        #[arg(long = "arg", allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Convert files and directories
    Batch {
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long, value_enum)]
        to: FormatArg,

        /// Output directory (default: output_dir from the configuration)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Parallel conversions
        #[arg(long)]
        workers: Option<usize>,

        /// Write a JSON report of the batch to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Validate an existing conversion result against its input
    Check { output: PathBuf, input: PathBuf },

    /// Print the effective configuration as RON
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Docx,
}

impl From<FormatArg> for DocFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Markdown => DocFormat::Markdown,
            FormatArg::Docx => DocFormat::Docx,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Pandoc,
    Builtin,
}

impl From<BackendArg> for BackendKind {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Pandoc => BackendKind::Pandoc,
            BackendArg::Builtin => BackendKind::Builtin,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log_level, cli.log_file.as_deref());

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            quack_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether the command succeeded.
fn run(cli: Cli) -> Result<bool> {
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.execution.backend = backend.into();
    }

    match cli.command {
        Commands::Convert {
            input,
            to,
            output,
            args,
        } => convert(config, &input, to.into(), output, &args),
        Commands::Batch {
            inputs,
            to,
            output_dir,
            workers,
            report,
        } => {
            if let Some(workers) = workers {
                config.execution.workers = workers;
            }
            batch(config, &inputs, to.into(), output_dir, report.as_deref())
        }
        Commands::Check { output, input } => check(config, &output, &input),
        Commands::Config => {
            println!("{}", config::to_ron(&config)?);
            Ok(true)
        }
    }
}

fn converter(config: ConversionConfig) -> Result<DocumentConverter> {
    let ctx = ConverterContext::from_config(config).with_progress(Arc::new(StderrProgress));
    DocumentConverter::new(ctx).context("cannot start converter")
}

fn convert(
    config: ConversionConfig,
    input: &Path,
    target: DocFormat,
    output: Option<PathBuf>,
    args: &[String],
) -> Result<bool> {
    let output = match output {
        Some(output) => output,
        None => {
            let source = probe(input, None)?;
            ConversionTask::new(source, target.clone()).resolve_output(Some(&config.output_dir))
        }
    };
    let mut converter = converter(config)?;
    let outcome = converter.convert_file_with_args(input, &output, &target, args);

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &outcome.validation_errors {
        eprintln!("validation: {error}");
    }
    if outcome.success {
        println!("{}", outcome.message.unwrap_or_default());
    } else {
        eprintln!("{}", outcome.error.unwrap_or_default());
    }
    Ok(outcome.success)
}

fn batch(
    config: ConversionConfig,
    inputs: &[PathBuf],
    target: DocFormat,
    output_dir: Option<PathBuf>,
    report: Option<&Path>,
) -> Result<bool> {
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
    let tasks = plan::plan_batch(inputs, &target, &output_dir)?;
    let mut converter = converter(config)?;
    let outcome = converter.convert_batch(&tasks, None);

    if let Some(report) = report {
        let dir = match report.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = report
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context("report path has no file name")?;
        write_batch_report(dir, &file_name, &outcome)?;
    }

    for failed in &outcome.failed {
        eprintln!("failed: {}", failed.display());
    }
    println!("{}", outcome.message.as_deref().unwrap_or_default());
    println!(
        "{} succeeded, {} failed, {:.2}s converting",
        outcome.metrics.successful_conversions,
        outcome.metrics.failed_conversions,
        outcome.metrics.total_conversion_seconds()
    );
    Ok(outcome.success)
}

fn check(config: ConversionConfig, output: &Path, input: &Path) -> Result<bool> {
    // Validation does not run the tool.
    let ctx = ConverterContext::new(config, Arc::new(Html2MdBackend));
    let converter = DocumentConverter::new(ctx)?;
    let valid = converter.validate_conversion(output, input);
    println!("{}: {}", output.display(), if valid { "valid" } else { "invalid" });
    Ok(valid)
}
