use std::fs;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use quackdoc_core::{BatchOutcome, ConversionOutcome, MetricsSnapshot};
use quackdoc_engine::write_batch_report;
use tempfile::TempDir;

#[test]
fn batch_report_is_pretty_json() {
    let temp = TempDir::new().unwrap();
    let ok = ConversionOutcome {
        success: true,
        output_path: Some(PathBuf::from("out/a.md")),
        attempts: 1,
        ..ConversionOutcome::default()
    };
    let bad = ConversionOutcome::failure("Failed to convert b.html");
    let mut metrics = MetricsSnapshot::default();
    metrics.successful_conversions = 1;
    metrics.failed_conversions = 1;
    let outcome = BatchOutcome::from_outcomes(
        vec![(PathBuf::from("a.html"), ok), (PathBuf::from("b.html"), bad)],
        metrics,
    );

    let path = write_batch_report(temp.path(), "report.json", &outcome).unwrap();

    assert_eq!(path, temp.path().join("report.json"));
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n  \"success\": false"));
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["succeeded"], serde_json::json!(["out/a.md"]));
    assert_eq!(value["failed"], serde_json::json!(["b.html"]));
    assert_eq!(value["metrics"]["failed_conversions"], 1);
    assert_eq!(value["outcomes"].as_array().unwrap().len(), 2);
    assert_eq!(
        value["error"],
        serde_json::json!("Failed to convert 1 of 2 files")
    );
}

#[test]
fn report_into_missing_directory_is_created() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("reports");
    let outcome = BatchOutcome::from_outcomes(Vec::new(), MetricsSnapshot::default());

    let path = write_batch_report(&dir, "empty.json", &outcome).unwrap();
    let back: BatchOutcome = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(back, outcome);
}
