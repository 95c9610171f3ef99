//! Telemetry sink that forwards measurements to the operator log.

use std::time::Duration;

use ability_core::{AbilityId, TelemetrySink};
use tracing::{debug, info};

/// Writes every measurement as a structured `tracing` event under
/// `runtime::telemetry`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExporter;

impl TelemetrySink for LogExporter {
    fn cast_success(&self, ability: &AbilityId, duration: Duration) {
        info!(
            target: "runtime::telemetry",
            ability = %ability,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "cast-success"
        );
    }

    fn cast_failure(&self, reason: &str) {
        info!(target: "runtime::telemetry", reason, "cast-failure");
    }

    fn effect_processing(&self, duration: Duration) {
        debug!(
            target: "runtime::telemetry",
            duration_ms = duration.as_secs_f64() * 1000.0,
            "effect-processing-duration"
        );
    }
}
