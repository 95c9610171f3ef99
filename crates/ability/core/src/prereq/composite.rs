use std::sync::Arc;

use super::{CheckContext, Prerequisite, PrerequisiteResult};

/// Evaluates child checks in order until one fails.
///
/// # Semantics
///
/// - If a child fails, the composite **stops immediately** and returns that
///   child's failure (reason included)
/// - If every child succeeds, the composite succeeds
/// - An empty composite succeeds
///
/// Put cheap checks first; later children are never evaluated once an
/// earlier one fails.
#[derive(Clone, Debug, Default)]
pub struct CompositeCheck {
    checks: Vec<Arc<dyn Prerequisite>>,
}

impl CompositeCheck {
    pub fn new(checks: Vec<Arc<dyn Prerequisite>>) -> Self {
        Self { checks }
    }

    /// Appends a check (builder pattern).
    #[must_use]
    pub fn with(mut self, check: impl Prerequisite + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn push(&mut self, check: Arc<dyn Prerequisite>) {
        self.checks.push(check);
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl Prerequisite for CompositeCheck {
    fn check(&self, ctx: &CheckContext<'_>) -> PrerequisiteResult {
        for check in &self.checks {
            let result = check.check(ctx);
            if !result.is_ok() {
                return result; // Short-circuit
            }
        }
        PrerequisiteResult::success()
    }

    /// Every child must pass, so the strictest level gate wins.
    fn min_level(&self) -> Option<u32> {
        self.checks.iter().filter_map(|check| check.min_level()).max()
    }
}
