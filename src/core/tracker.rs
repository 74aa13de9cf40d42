//! Rolling-window latency tracking.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::validate::normalize_latency;

/// Samples retained when no explicit maximum is given.
pub const DEFAULT_MAX_SAMPLES: usize = 100;

/// A single latency measurement.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub latency_ms: i64,
}

/// Tracks recent latency samples in a bounded FIFO window.
///
/// All methods take `&self`; the sample set lives behind a mutex so
/// independent tasks can record and query concurrently.
#[derive(Debug)]
pub struct LatencyTracker {
    inner: Mutex<Window>,
}

#[derive(Debug)]
struct Window {
    samples: VecDeque<Sample>,
    max_samples: usize,
}

impl LatencyTracker {
    /// Create a tracker retaining up to [`DEFAULT_MAX_SAMPLES`] samples.
    pub fn new() -> Self {
        Self::with_max(DEFAULT_MAX_SAMPLES)
    }

    /// Create a tracker with an explicit sample maximum. A maximum of 0 is
    /// coerced to 1; a tracker always holds at least one sample.
    pub fn with_max(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            inner: Mutex::new(Window {
                samples: VecDeque::with_capacity(max_samples),
                max_samples,
            }),
        }
    }

    fn window(&self) -> MutexGuard<'_, Window> {
        // A poisoned lock still holds a consistent sample set; no operation
        // panics while it is held.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a latency sample at the current time. Negative latency is
    /// clamped to zero. Never fails.
    pub fn record(&self, latency_ms: i64) {
        self.record_at(latency_ms, Utc::now());
    }

    /// Record a latency sample with an explicit timestamp. The oldest
    /// sample is evicted once the maximum is exceeded.
    pub fn record_at(&self, latency_ms: i64, timestamp: DateTime<Utc>) {
        let mut window = self.window();
        window.samples.push_back(Sample {
            timestamp,
            latency_ms: normalize_latency(latency_ms),
        });
        if window.samples.len() > window.max_samples {
            window.samples.pop_front();
        }
    }

    /// Average latency of samples newer than `now - window`, or `fallback`
    /// when none qualify. Integer mean, truncated toward zero.
    pub fn average(&self, window: Duration, fallback: i64) -> i64 {
        let cutoff = Utc::now() - window;
        let guard = self.window();

        let mut sum = 0i64;
        let mut count = 0i64;
        for sample in guard.samples.iter().filter(|s| s.timestamp > cutoff) {
            sum += sample.latency_ms;
            count += 1;
        }

        if count == 0 {
            fallback
        } else {
            sum / count
        }
    }

    /// Maximum latency of samples newer than `now - window`, or `fallback`
    /// when none qualify.
    pub fn max(&self, window: Duration, fallback: i64) -> i64 {
        let cutoff = Utc::now() - window;
        self.window()
            .samples
            .iter()
            .filter(|s| s.timestamp > cutoff)
            .map(|s| s.latency_ms)
            .max()
            .unwrap_or(fallback)
    }

    /// Number of retained samples, regardless of age.
    pub fn count(&self) -> usize {
        self.window().samples.len()
    }

    /// Drop all retained samples. Idempotent.
    pub fn clear(&self) {
        self.window().samples.clear();
    }

    /// Snapshot of the tracker over a one-minute window, computed under a
    /// single lock acquisition.
    pub fn status(&self) -> TrackerStatus {
        let guard = self.window();
        let cutoff = Utc::now() - Duration::minutes(1);

        let mut sum = 0i64;
        let mut count = 0i64;
        let mut max = None;
        for sample in guard.samples.iter().filter(|s| s.timestamp > cutoff) {
            sum += sample.latency_ms;
            count += 1;
            max = Some(max.map_or(sample.latency_ms, |m: i64| m.max(sample.latency_ms)));
        }

        TrackerStatus {
            count: guard.samples.len(),
            avg_ms: if count == 0 { 0 } else { sum / count },
            max_ms: max.unwrap_or(0),
            max_samples: guard.max_samples,
        }
    }
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable tracker snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStatus {
    pub count: usize,
    pub avg_ms: i64,
    pub max_ms: i64,
    pub max_samples: usize,
}
