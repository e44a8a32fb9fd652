//! Concrete pipeline stages.
//!
//! The stage set mirrors one step of the simulation: log the bar, select a
//! universe or compute/replay signals, slice today's row into long/flat
//! buckets, weight the long bucket, and propagate policy constraints.

use crate::domain::algo::{Algo, RunOnce};
use crate::domain::context::StepContext;
use crate::domain::error::ParseError;
use crate::domain::expr::SignalExpr;
use crate::domain::expr_eval::evaluate;
use crate::domain::expr_parser::parse;
use crate::domain::signal::{SignalTable, FLAT_SIGNAL, LONG_SIGNAL};
use std::collections::HashMap;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Long,
    Flat,
}

/// Reports the current step index and date. Side channel only.
#[derive(Debug, Default)]
pub struct LogBar;

impl Algo for LogBar {
    fn name(&self) -> &'static str {
        "LogBar"
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        info!(idx = ctx.idx, date = %ctx.now, "bar");
        true
    }
}

/// Copies the full universe into a directional bucket.
#[derive(Debug)]
pub struct SelectAll {
    direction: Direction,
}

impl SelectAll {
    pub fn new() -> Self {
        Self {
            direction: Direction::Long,
        }
    }

    pub fn with_direction(direction: Direction) -> Self {
        Self { direction }
    }
}

impl Default for SelectAll {
    fn default() -> Self {
        Self::new()
    }
}

impl Algo for SelectAll {
    fn name(&self) -> &'static str {
        "SelectAll"
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        let selected = ctx.universe.to_vec();
        match self.direction {
            Direction::Long => ctx.long = Some(selected),
            Direction::Flat => ctx.flat = Some(selected),
        }
        true
    }
}

/// Partition today's signal row: 1 goes long, -1 goes flat, anything else
/// into neither bucket. Bucket order follows the table's column order.
fn apply_day_slice(table: &SignalTable, ctx: &mut StepContext<'_>) -> bool {
    let Some(slice) = table.day_slice(ctx.now) else {
        warn!(date = %ctx.now, "date not in signal table, selecting nothing");
        ctx.long = Some(Vec::new());
        ctx.flat = Some(Vec::new());
        return true;
    };

    let mut long = Vec::new();
    let mut flat = Vec::new();
    for (symbol, value) in slice {
        if value == LONG_SIGNAL {
            long.push(symbol.to_string());
        } else if value == FLAT_SIGNAL {
            flat.push(symbol.to_string());
        }
    }
    ctx.long = Some(long);
    ctx.flat = Some(flat);
    true
}

/// Selects from a precomputed signal table by slicing the current date.
#[derive(Debug)]
pub struct SelectWhere {
    signal: SignalTable,
}

impl SelectWhere {
    pub fn new(signal: SignalTable) -> Self {
        Self { signal }
    }
}

impl Algo for SelectWhere {
    fn name(&self) -> &'static str {
        "SelectWhere"
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        apply_day_slice(&self.signal, ctx)
    }
}

/// Expression-driven signal computation: compute once, replay thereafter.
///
/// The first invocation evaluates both expressions for every instrument in
/// the universe and assembles the full signal table; that table is retained
/// for the life of the instance and every later invocation only slices the
/// current date's row. The long expression contributes +1 where it fires,
/// the flat expression -1; a date where both fire sums to a value that
/// selects the instrument into neither bucket.
pub struct SelectByExpr {
    long_expr: SignalExpr,
    flat_expr: SignalExpr,
    gate: RunOnce,
    signal: Option<SignalTable>,
}

impl SelectByExpr {
    /// Parses both expression strings; a malformed expression or an
    /// unresolved identifier is a configuration error surfaced here, before
    /// the pipeline ever runs.
    pub fn new(long_expr: &str, flat_expr: &str) -> Result<Self, ParseError> {
        Ok(Self {
            long_expr: parse(long_expr)?,
            flat_expr: parse(flat_expr)?,
            gate: RunOnce::new(),
            signal: None,
        })
    }

    pub fn from_parsed(long_expr: SignalExpr, flat_expr: SignalExpr) -> Self {
        Self {
            long_expr,
            flat_expr,
            gate: RunOnce::new(),
            signal: None,
        }
    }

    /// True once the table has been computed.
    pub fn is_computed(&self) -> bool {
        self.signal.is_some()
    }

    fn compute_table(&self, ctx: &StepContext<'_>) -> SignalTable {
        let mut table = SignalTable::new(ctx.market.dates().to_vec(), ctx.universe.to_vec());
        for symbol in ctx.universe {
            let Some(prices) = ctx.market.series(symbol) else {
                warn!(%symbol, "no price series for instrument, leaving column empty");
                continue;
            };
            let long_fired = evaluate(&self.long_expr, prices);
            let flat_fired = evaluate(&self.flat_expr, prices);
            let column: Vec<i8> = long_fired
                .iter()
                .zip(&flat_fired)
                .map(|(&l, &f)| l as i8 - f as i8)
                .collect();
            table.set_column(symbol, column);
        }
        table
    }
}

impl Algo for SelectByExpr {
    fn name(&self) -> &'static str {
        "SelectByExpr"
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        if self.gate.fire() {
            self.signal = Some(self.compute_table(ctx));
        }
        match &self.signal {
            Some(table) => apply_day_slice(table, ctx),
            None => false,
        }
    }
}

/// Equal weights over the long bucket. The flat bucket carries no weights:
/// a downstream rebalancer closes whatever is no longer weighted.
#[derive(Debug, Default)]
pub struct WeighEqually;

impl Algo for WeighEqually {
    fn name(&self) -> &'static str {
        "WeighEqually"
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        if let Some(selected) = &ctx.long {
            let n = selected.len();
            ctx.weights = if n == 0 {
                HashMap::new()
            } else {
                let w = 1.0 / n as f64;
                selected.iter().map(|s| (s.clone(), w)).collect()
            };
        }
        true
    }
}

/// Propagates configured policy limits into the context. Declares the
/// run-always capability so limits land even on a vetoed step.
#[derive(Debug)]
pub struct Constraint {
    max_weight: Option<f64>,
    run_always: bool,
}

impl Constraint {
    pub fn new(max_weight: Option<f64>) -> Self {
        Self {
            max_weight,
            run_always: true,
        }
    }

    pub fn with_run_always(mut self, run_always: bool) -> Self {
        self.run_always = run_always;
        self
    }
}

impl Algo for Constraint {
    fn name(&self) -> &'static str {
        "Constraint"
    }

    fn run_always(&self) -> Option<bool> {
        Some(self.run_always)
    }

    fn execute(&mut self, ctx: &mut StepContext<'_>) -> bool {
        if let Some(max_weight) = self.max_weight {
            ctx.max_weight = Some(max_weight);
        }
        true
    }
}
