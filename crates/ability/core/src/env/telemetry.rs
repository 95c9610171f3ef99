use std::time::Duration;

use crate::ability::AbilityId;

/// Receiver of cast telemetry.
///
/// Implementations must not block; the pipeline calls these inline.
pub trait TelemetrySink: Send + Sync {
    fn cast_success(&self, ability: &AbilityId, duration: Duration);

    fn cast_failure(&self, reason: &str);

    fn effect_processing(&self, duration: Duration);
}
