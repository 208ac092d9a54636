use std::path::PathBuf;

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use quackdoc_core::{
    BatchOutcome, ConversionOutcome, MetricsConfig, MetricsSnapshot, MetricsTracker, SizeRecord,
};

#[test]
fn record_stores_timing_and_sizes() {
    let mut tracker = MetricsTracker::new(MetricsConfig::default());
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let end = start + Duration::milliseconds(1500);

    tracker.begin();
    tracker.record("a.html", start, end, 200, 50);
    tracker.record_success("a.html");

    let snap = tracker.snapshot();
    assert_eq!(snap.conversion_times["a.html"].seconds(), 1.5);
    assert_eq!(snap.file_sizes["a.html"], SizeRecord::new(200, 50));
    assert_eq!(snap.file_sizes["a.html"].ratio, 0.25);
    assert_eq!(snap.successful_conversions, 1);
    assert_eq!(snap.in_flight(), 0);
}

#[test]
fn zero_original_size_gives_zero_ratio() {
    assert_eq!(SizeRecord::new(0, 120).ratio, 0.0);
}

#[test]
fn toggles_disable_recording() {
    let mut tracker = MetricsTracker::new(MetricsConfig {
        track_conversion_time: false,
        track_file_sizes: false,
    });
    let now = Utc::now();
    tracker.record("x", now, now, 1, 1);
    assert!(tracker.snapshot().conversion_times.is_empty());
    assert!(tracker.snapshot().file_sizes.is_empty());
}

#[test]
fn counters_never_exceed_attempts() {
    let mut tracker = MetricsTracker::new(MetricsConfig::default());
    tracker.begin();
    tracker.begin();
    let snap = tracker.snapshot();
    assert!(snap.successful_conversions + snap.failed_conversions <= snap.total_attempts);
    assert_eq!(snap.in_flight(), 2);

    tracker.record_failure("b.html", "tool exploded");
    assert_eq!(tracker.snapshot().errors["b.html"], "tool exploded");
    assert_eq!(tracker.snapshot().in_flight(), 1);
}

#[test]
fn merge_adds_counters_and_maps() {
    let mut left = MetricsTracker::new(MetricsConfig::default());
    left.begin();
    left.record_success("a");
    let mut right = MetricsTracker::new(MetricsConfig::default());
    right.begin();
    right.record_failure("b", "bad");

    let mut merged = MetricsSnapshot::default();
    merged.merge(left.into_snapshot());
    merged.merge(right.into_snapshot());
    assert_eq!(merged.total_attempts, 2);
    assert_eq!(merged.successful_conversions, 1);
    assert_eq!(merged.failed_conversions, 1);
    assert_eq!(merged.errors.len(), 1);
}

fn ok(output: &str) -> ConversionOutcome {
    ConversionOutcome {
        success: true,
        output_path: Some(PathBuf::from(output)),
        ..ConversionOutcome::default()
    }
}

#[test]
fn batch_messages_distinguish_full_partial_and_total_failure() {
    let full = BatchOutcome::from_outcomes(
        vec![(PathBuf::from("a.html"), ok("a.md"))],
        MetricsSnapshot::default(),
    );
    assert!(full.success);
    assert_eq!(full.message.as_deref(), Some("Successfully converted 1 files"));
    assert_eq!(full.error, None);

    let partial = BatchOutcome::from_outcomes(
        vec![
            (PathBuf::from("a.html"), ok("a.md")),
            (PathBuf::from("b.html"), ConversionOutcome::failure("boom")),
            (PathBuf::from("c.html"), ok("c.md")),
        ],
        MetricsSnapshot::default(),
    );
    assert!(!partial.success);
    assert_eq!(partial.succeeded, vec![PathBuf::from("a.md"), PathBuf::from("c.md")]);
    assert_eq!(partial.failed, vec![PathBuf::from("b.html")]);
    assert_eq!(
        partial.message.as_deref(),
        Some("Partially successful: converted 2 of 3 files (1 failed)")
    );

    let none = BatchOutcome::from_outcomes(
        vec![(PathBuf::from("b.html"), ConversionOutcome::failure("boom"))],
        MetricsSnapshot::default(),
    );
    assert_eq!(none.message.as_deref(), Some("All 1 conversions failed"));

    let empty = BatchOutcome::from_outcomes(Vec::new(), MetricsSnapshot::default());
    assert!(empty.success);
    assert_eq!(empty.message.as_deref(), Some("No files to convert"));
}
