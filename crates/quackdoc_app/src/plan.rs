use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use quackdoc_core::{ConversionDirection, ConversionTask, DocFormat, FileDescriptor};
use quackdoc_engine::probe;
use quackdoc_logging::{quack_debug, quack_warn};
use walkdir::WalkDir;

/// Expands batch inputs into tasks with explicit, distinct output paths.
///
/// Files map to `output_dir/<stem>.<ext>`. Directories are walked recursively and keep
/// their relative layout under `output_dir`; only files whose format converts to
/// `target` are picked up.
pub fn plan_batch(
    inputs: &[PathBuf],
    target: &DocFormat,
    output_dir: &Path,
) -> Result<Vec<ConversionTask>> {
    let mut tasks = Vec::new();
    for input in inputs {
        if input.is_dir() {
            plan_directory(input, target, output_dir, &mut tasks)?;
        } else {
            let task = ConversionTask::new(describe(input), target.clone());
            let output = task.resolve_output(Some(output_dir));
            tasks.push(task.with_output(output));
        }
    }

    let mut seen = HashSet::new();
    for task in &tasks {
        let output = task.resolve_output(None);
        if !seen.insert(output.clone()) {
            bail!(
                "more than one input would be written to {}; convert them separately",
                output.display()
            );
        }
    }
    Ok(tasks)
}

fn plan_directory(
    root: &Path,
    target: &DocFormat,
    output_dir: &Path,
    tasks: &mut Vec<ConversionTask>,
) -> Result<()> {
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let format = DocFormat::from_path(path);
        if ConversionDirection::resolve(&format, target).is_none() {
            quack_debug!("skipping {}: {format} does not convert to {target}", path.display());
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let output = output_dir.join(relative).with_extension(target.extension());
        tasks.push(ConversionTask::new(describe(path), target.clone()).with_output(output));
    }
    Ok(())
}

/// Unreadable inputs still become tasks so they are reported as failed conversions.
fn describe(path: &Path) -> FileDescriptor {
    probe(path, None).unwrap_or_else(|err| {
        quack_warn!("{err}");
        FileDescriptor {
            path: path.to_path_buf(),
            format: DocFormat::from_path(path),
            size_bytes: 0,
            modified: None,
            extra_args: Vec::new(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<p>x</p>").unwrap();
    }

    fn outputs(tasks: &[ConversionTask]) -> Vec<PathBuf> {
        tasks.iter().map(|t| t.resolve_output(None)).collect()
    }

    #[test]
    fn directory_inputs_keep_their_layout() {
        let temp = TempDir::new().unwrap();
        let site = temp.path().join("site");
        touch(&site.join("index.html"));
        touch(&site.join("guide").join("intro.htm"));
        touch(&site.join("notes.txt"));
        touch(&site.join("readme.md"));
        let out = temp.path().join("out");

        let tasks = plan_batch(&[site.clone()], &DocFormat::Markdown, &out).unwrap();

        assert_eq!(
            outputs(&tasks),
            vec![out.join("guide").join("intro.md"), out.join("index.md")]
        );
        assert_eq!(tasks[1].source.path, site.join("index.html"));
        assert_eq!(tasks[1].source.format, DocFormat::Html);
    }

    #[test]
    fn file_inputs_land_in_the_output_dir() {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("report.md");
        touch(&report);
        let missing = temp.path().join("missing.md");
        let out = temp.path().join("out");

        let tasks = plan_batch(&[report, missing.clone()], &DocFormat::Docx, &out).unwrap();

        assert_eq!(
            outputs(&tasks),
            vec![out.join("report.docx"), out.join("missing.docx")]
        );
        assert_eq!(tasks[1].source.path, missing);
        assert_eq!(tasks[1].source.size_bytes, 0);
    }

    #[test]
    fn colliding_outputs_are_rejected() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("a").join("page.html");
        let second = temp.path().join("b").join("page.html");
        touch(&first);
        touch(&second);

        let err = plan_batch(&[first, second], &DocFormat::Markdown, temp.path()).unwrap_err();
        assert!(err.to_string().contains("page.md"));
    }
}
