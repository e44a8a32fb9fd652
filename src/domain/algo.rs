//! Unit-of-work contract and the run-once latch.

use crate::domain::context::StepContext;

/// One reusable pipeline stage.
///
/// `execute` returning `true` means "succeeded, continue pipeline"; `false`
/// means "halt the pipeline from this point" (subject to the run-always
/// override in [`Strategy`](crate::domain::strategy::Strategy)). A stage
/// that cannot satisfy its contract reports `false`; failure is never
/// signalled by panicking.
///
/// `run_always` is tri-state: `None` means the capability is not declared,
/// `Some(false)` declared but off, `Some(true)` declared and on. Declaring
/// it (either value) switches the owning strategy into override mode.
pub trait Algo {
    /// Stable identifier, the concrete type's name.
    fn name(&self) -> &'static str;

    fn run_always(&self) -> Option<bool> {
        None
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool;
}

/// Latch gate: armed → fired, one way.
///
/// The first invocation returns `true`; every later one returns `false`
/// with no side effects. Standalone it makes a run-once pipeline stage;
/// composed (via [`fire`](RunOnce::fire)) it lets a stateful stage tell
/// "first call, must compute" from "later call, must replay".
#[derive(Debug, Default)]
pub struct RunOnce {
    has_run: bool,
}

impl RunOnce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&mut self) -> bool {
        if self.has_run {
            return false;
        }
        self.has_run = true;
        true
    }
}

impl Algo for RunOnce {
    fn name(&self) -> &'static str {
        "RunOnce"
    }

    fn execute(&mut self, _ctx: &mut StepContext<'_>) -> bool {
        self.fire()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::MarketData;
    use chrono::NaiveDate;

    fn ctx_fixture<'a>(universe: &'a [String], market: &'a MarketData) -> StepContext<'a> {
        StepContext::new(0, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), universe, market)
    }

    #[test]
    fn latch_fires_exactly_once() {
        let market = MarketData::default();
        let universe: Vec<String> = Vec::new();
        let mut ctx = ctx_fixture(&universe, &market);

        let mut latch = RunOnce::new();
        assert!(latch.execute(&mut ctx));
        for _ in 0..10 {
            assert!(!latch.execute(&mut ctx));
        }
    }

    #[test]
    fn fire_and_execute_share_state() {
        let market = MarketData::default();
        let universe: Vec<String> = Vec::new();
        let mut ctx = ctx_fixture(&universe, &market);

        let mut latch = RunOnce::new();
        assert!(latch.fire());
        assert!(!latch.execute(&mut ctx));
    }

    #[test]
    fn latch_has_no_run_always_capability() {
        let latch = RunOnce::new();
        assert_eq!(latch.run_always(), None);
        assert_eq!(latch.name(), "RunOnce");
    }
}
