//! Fire-and-forget cast telemetry.
//!
//! - [`CastMetrics`]: lock-free counters with a serializable snapshot
//! - [`Telemetry`]: the [`TelemetrySink`] handed to the pipeline; records
//!   metrics and fans measurements out to registered exporters
//! - [`LogExporter`]: exporter writing measurements to the operator log

mod exporter;
mod metrics;

pub use exporter::LogExporter;
pub use metrics::{CastMetrics, MetricsSnapshot};

use std::sync::Arc;
use std::time::Duration;

use ability_core::{AbilityId, TelemetrySink};

/// Metrics plus external exporters behind one [`TelemetrySink`].
#[derive(Clone, Default)]
pub struct Telemetry {
    metrics: Arc<CastMetrics>,
    exporters: Vec<Arc<dyn TelemetrySink>>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exporter (builder pattern).
    #[must_use]
    pub fn with_exporter(mut self, exporter: Arc<dyn TelemetrySink>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn metrics(&self) -> Arc<CastMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn exporter_count(&self) -> usize {
        self.exporters.len()
    }
}

impl TelemetrySink for Telemetry {
    fn cast_success(&self, ability: &AbilityId, duration: Duration) {
        self.metrics.record_success(duration);
        for exporter in &self.exporters {
            exporter.cast_success(ability, duration);
        }
    }

    fn cast_failure(&self, reason: &str) {
        self.metrics.record_failure();
        for exporter in &self.exporters {
            exporter.cast_failure(reason);
        }
    }

    fn effect_processing(&self, duration: Duration) {
        self.metrics.record_impact(duration);
        for exporter in &self.exporters {
            exporter.effect_processing(duration);
        }
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("metrics", &self.metrics)
            .field("exporters", &self.exporters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        failures: Mutex<Vec<String>>,
    }

    impl TelemetrySink for Recorder {
        fn cast_success(&self, _ability: &AbilityId, _duration: Duration) {}

        fn cast_failure(&self, reason: &str) {
            if let Ok(mut failures) = self.failures.lock() {
                failures.push(reason.to_owned());
            }
        }

        fn effect_processing(&self, _duration: Duration) {}
    }

    #[test]
    fn measurements_fan_out_to_exporters() {
        let recorder = Arc::new(Recorder::default());
        let telemetry = Telemetry::new()
            .with_exporter(recorder.clone())
            .with_exporter(Arc::new(LogExporter));

        telemetry.cast_failure("on cooldown");
        telemetry.cast_success(&AbilityId::new("fireball"), Duration::from_millis(1));

        assert_eq!(telemetry.metrics().failures(), 1);
        assert_eq!(telemetry.metrics().successes(), 1);
        let failures = recorder.failures.lock().map(|f| f.clone()).unwrap_or_default();
        assert_eq!(failures, vec!["on cooldown".to_owned()]);
    }
}
