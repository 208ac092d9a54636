use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MetricsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimingRecord {
    pub fn seconds(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeRecord {
    pub original: u64,
    pub converted: u64,
    /// `converted / original`, 0 when the original is empty.
    pub ratio: f64,
}

impl SizeRecord {
    pub fn new(original: u64, converted: u64) -> Self {
        let ratio = if original == 0 {
            0.0
        } else {
            converted as f64 / original as f64
        };
        Self {
            original,
            converted,
            ratio,
        }
    }
}

/// Accumulated statistics for one batch (or for the single-file calls of a converter).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub conversion_times: BTreeMap<String, TimingRecord>,
    pub file_sizes: BTreeMap<String, SizeRecord>,
    pub errors: BTreeMap<String, String>,
    pub total_attempts: u64,
    pub successful_conversions: u64,
    pub failed_conversions: u64,
}

impl MetricsSnapshot {
    /// Folds a per-worker snapshot into this one.
    pub fn merge(&mut self, other: MetricsSnapshot) {
        self.conversion_times.extend(other.conversion_times);
        self.file_sizes.extend(other.file_sizes);
        self.errors.extend(other.errors);
        self.total_attempts += other.total_attempts;
        self.successful_conversions += other.successful_conversions;
        self.failed_conversions += other.failed_conversions;
    }

    /// Files started but not yet finished.
    pub fn in_flight(&self) -> u64 {
        self.total_attempts
            .saturating_sub(self.successful_conversions + self.failed_conversions)
    }

    pub fn total_conversion_seconds(&self) -> f64 {
        self.conversion_times.values().map(TimingRecord::seconds).sum()
    }
}

/// Records per-file statistics into a [`MetricsSnapshot`] under the configured toggles.
#[derive(Debug, Clone, Default)]
pub struct MetricsTracker {
    config: MetricsConfig,
    snapshot: MetricsSnapshot,
}

impl MetricsTracker {
    pub fn new(config: MetricsConfig) -> Self {
        Self {
            config,
            snapshot: MetricsSnapshot::default(),
        }
    }

    pub fn snapshot(&self) -> &MetricsSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> MetricsSnapshot {
        self.snapshot
    }

    pub fn reset(&mut self) {
        self.snapshot = MetricsSnapshot::default();
    }

    /// A file conversion has started.
    pub fn begin(&mut self) {
        self.snapshot.total_attempts += 1;
    }

    pub fn record(
        &mut self,
        key: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        original_size: u64,
        converted_size: u64,
    ) {
        if self.config.track_conversion_time {
            self.snapshot
                .conversion_times
                .insert(key.to_string(), TimingRecord { start, end });
        }
        if self.config.track_file_sizes {
            self.snapshot
                .file_sizes
                .insert(key.to_string(), SizeRecord::new(original_size, converted_size));
        }
    }

    pub fn record_success(&mut self, key: &str) {
        self.snapshot.errors.remove(key);
        self.snapshot.successful_conversions += 1;
    }

    pub fn record_failure(&mut self, key: &str, error: impl Into<String>) {
        self.snapshot.errors.insert(key.to_string(), error.into());
        self.snapshot.failed_conversions += 1;
    }

    pub fn merge(&mut self, other: MetricsSnapshot) {
        self.snapshot.merge(other);
    }
}
