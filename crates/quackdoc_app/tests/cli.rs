use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PAGE: &str = "<html><body><h1>Release notes</h1>\
<p>The new build is out and it converts documents faster than ever before.</p>\
<p>Upgrade at your convenience; nothing else changes.</p></body></html>";

fn quackdoc() -> Command {
    let mut cmd = Command::cargo_bin("quackdoc").expect("binary exists");
    cmd.arg("--backend").arg("builtin");
    cmd
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn config_prints_defaults_as_ron() {
    quackdoc()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max_conversion_retries: 3"))
        .stdout(predicate::str::contains("backend: builtin"));
}

#[test]
fn convert_html_to_markdown_with_builtin_backend() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.html");
    write(&input, PAGE);
    let output = temp.path().join("md").join("notes.md");

    quackdoc()
        .arg("convert")
        .arg(&input)
        .args(["--to", "markdown", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully converted"));

    let markdown = fs::read_to_string(&output).unwrap();
    assert!(markdown.contains("Release notes"), "{markdown}");
    assert!(markdown.contains("faster than ever"), "{markdown}");
}

#[test]
fn unsupported_direction_fails() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.md");
    write(&input, "# Notes\n");

    quackdoc()
        .arg("convert")
        .arg(&input)
        .args(["--to", "markdown", "--output"])
        .arg(temp.path().join("copy.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported conversion from markdown to markdown"));
}

#[test]
fn batch_walks_directories_and_writes_a_report() {
    let temp = TempDir::new().unwrap();
    let site = temp.path().join("site");
    write(&site.join("index.html"), PAGE);
    write(&site.join("guide").join("intro.html"), PAGE);
    write(&site.join("notes.txt"), "ignored");
    let out = temp.path().join("out");
    let report = temp.path().join("report.json");

    quackdoc()
        .arg("batch")
        .arg(&site)
        .args(["--to", "markdown", "--workers", "2", "--output-dir"])
        .arg(&out)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully converted 2 files"));

    assert!(out.join("index.md").is_file());
    assert!(out.join("guide").join("intro.md").is_file());
    let json = fs::read_to_string(&report).unwrap();
    assert!(json.contains("\"success\": true"), "{json}");
}

#[test]
fn batch_with_missing_input_exits_non_zero() {
    let temp = TempDir::new().unwrap();
    let good = temp.path().join("good.html");
    write(&good, PAGE);

    quackdoc()
        .arg("batch")
        .arg(&good)
        .arg(temp.path().join("missing.html"))
        .args(["--to", "markdown", "--output-dir"])
        .arg(temp.path().join("out"))
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Partially successful: converted 1 of 2 files (1 failed)",
        ))
        .stderr(predicate::str::contains("missing.html"));
}

#[test]
fn check_reports_validity() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.html");
    write(&input, PAGE);
    let output = temp.path().join("notes.md");
    write(
        &output,
        "# Release notes\n\nThe new build is out and it converts documents faster.\n",
    );

    quackdoc()
        .arg("check")
        .arg(&output)
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));

    quackdoc()
        .arg("check")
        .arg(temp.path().join("absent.md"))
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("invalid"));
}

#[test]
fn invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("quackdoc.ron");
    write(&config, "(retry_mechanism: (max_conversion_retries: 0))");

    quackdoc()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_conversion_retries"));
}
