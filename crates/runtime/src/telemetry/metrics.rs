//! Cast and impact counters.
//!
//! Tracks success/failure counts and time spent in compute and impact
//! resolution.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Cast metrics shared by the pipeline and the deferred-effect service.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct CastMetrics {
    /// Casts that reached a successful terminal state
    successes: AtomicU64,

    /// Rejected or faulted casts
    failures: AtomicU64,

    /// Total compute time of successful casts, in nanoseconds
    total_cast_time_nanos: AtomicU64,

    /// Impacts resolved by the deferred-effect service
    impacts: AtomicU64,

    /// Total impact resolution time, in nanoseconds
    total_effect_time_nanos: AtomicU64,
}

impl CastMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, duration: Duration) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.total_cast_time_nanos
            .fetch_add(saturating_nanos(duration), Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_impact(&self, duration: Duration) {
        self.impacts.fetch_add(1, Ordering::Relaxed);
        self.total_effect_time_nanos
            .fetch_add(saturating_nanos(duration), Ordering::Relaxed);
    }

    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn impacts(&self) -> u64 {
        self.impacts.load(Ordering::Relaxed)
    }

    /// Average compute time of successful casts.
    pub fn avg_cast_time(&self) -> Duration {
        average(
            self.total_cast_time_nanos.load(Ordering::Relaxed),
            self.successes(),
        )
    }

    /// Average impact resolution time.
    pub fn avg_effect_time(&self) -> Duration {
        average(
            self.total_effect_time_nanos.load(Ordering::Relaxed),
            self.impacts(),
        )
    }

    /// Returns success rate as a percentage (0-100).
    pub fn success_rate(&self) -> f64 {
        let successes = self.successes();
        let total = successes + self.failures();

        if total == 0 {
            100.0
        } else {
            (successes as f64 / total as f64) * 100.0
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Individual fields are read atomically; the snapshot as a whole may mix
    /// values from concurrent updates.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            successes: self.successes(),
            failures: self.failures(),
            impacts: self.impacts(),
            avg_cast_time_micros: micros(self.avg_cast_time()),
            avg_effect_time_micros: micros(self.avg_effect_time()),
            success_rate: self.success_rate(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub successes: u64,
    pub failures: u64,
    pub impacts: u64,
    pub avg_cast_time_micros: u64,
    pub avg_effect_time_micros: u64,
    pub success_rate: f64,
}

fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

fn average(total_nanos: u64, count: u64) -> Duration {
    if count == 0 {
        Duration::ZERO
    } else {
        Duration::from_nanos(total_nanos / count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_metrics_report_full_success_rate() {
        let metrics = CastMetrics::new();
        assert_eq!(metrics.success_rate(), 100.0);
        assert_eq!(metrics.avg_cast_time(), Duration::ZERO);
    }

    #[test]
    fn snapshot_reflects_recorded_values() {
        let metrics = CastMetrics::new();
        metrics.record_success(Duration::from_micros(30));
        metrics.record_success(Duration::from_micros(10));
        metrics.record_failure();
        metrics.record_impact(Duration::from_micros(8));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.successes, 2);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.impacts, 1);
        assert_eq!(snapshot.avg_cast_time_micros, 20);
        assert_eq!(snapshot.avg_effect_time_micros, 8);
    }
}
