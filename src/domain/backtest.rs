//! Time-step driver.
//!
//! Iterates the unified timeline strictly in date order, builds one fresh
//! context per date, invokes the strategy once, and records what each step
//! decided. A vetoed step is recorded with `accepted == false` and the run
//! continues; stateful stages (the latch in particular) depend on every
//! date being visited exactly once, in order, so a `Strategy` instance is
//! single-use per run.

use crate::domain::context::StepContext;
use crate::domain::market::MarketData;
use crate::domain::strategy::Strategy;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One step's outcome as read back from the context.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub idx: usize,
    pub date: NaiveDate,
    pub accepted: bool,
    pub long: Vec<String>,
    pub flat: Vec<String>,
    pub weights: HashMap<String, f64>,
    pub max_weight: Option<f64>,
}

pub fn run(strategy: &mut Strategy, market: &MarketData, universe: &[String]) -> Vec<StepRecord> {
    let mut records = Vec::with_capacity(market.len());

    for (idx, &date) in market.dates().iter().enumerate() {
        let mut ctx = StepContext::new(idx, date, universe, market);
        let accepted = strategy.execute(&mut ctx);
        records.push(StepRecord {
            idx,
            date,
            accepted,
            long: ctx.long.unwrap_or_default(),
            flat: ctx.flat.unwrap_or_default(),
            weights: ctx.weights,
            max_weight: ctx.max_weight,
        });
    }

    records
}
