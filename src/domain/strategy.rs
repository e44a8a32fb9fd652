//! Strategy orchestrator.
//!
//! Runs an ordered stage list with short-circuit-with-override semantics.
//! When no stage declares the run-always capability the pipeline is a pure
//! short-circuit AND. When any stage declares it, a vetoed step still
//! invokes the stages whose flag is set to true, but their results are
//! discarded: nothing revives a vetoed step.

use crate::domain::algo::Algo;
use crate::domain::context::StepContext;

pub struct Strategy {
    pub name: String,
    algos: Vec<Box<dyn Algo>>,
    check_run_always: bool,
}

impl Strategy {
    pub fn new(name: impl Into<String>, algos: Vec<Box<dyn Algo>>) -> Self {
        let check_run_always = algos.iter().any(|algo| algo.run_always().is_some());
        Self {
            name: name.into(),
            algos,
            check_run_always,
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.algos.iter().map(|algo| algo.name()).collect()
    }

    /// Run every stage against the step's context. The returned flag is the
    /// step's overall outcome; the driver decides what a vetoed step means.
    pub fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        if !self.check_run_always {
            for algo in &mut self.algos {
                if !algo.execute(ctx) {
                    return false;
                }
            }
            return true;
        }

        let mut res = true;
        for algo in &mut self.algos {
            if res {
                res = algo.execute(ctx);
            } else if algo.run_always() == Some(true) {
                algo.execute(ctx);
            }
        }
        res
    }
}
