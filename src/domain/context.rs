//! Per-step pipeline context.
//!
//! One record per simulated date, created by the driver, mutated in place
//! by the stages, and discarded after the step. `long`/`flat` are `Option`
//! so "selection never ran" stays distinguishable from "selection ran and
//! chose nothing"; `weights` defaults to empty and is never absent.

use crate::domain::market::MarketData;
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug)]
pub struct StepContext<'a> {
    pub idx: usize,
    pub now: NaiveDate,
    pub universe: &'a [String],
    pub market: &'a MarketData,
    pub long: Option<Vec<String>>,
    pub flat: Option<Vec<String>>,
    pub weights: HashMap<String, f64>,
    pub max_weight: Option<f64>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        idx: usize,
        now: NaiveDate,
        universe: &'a [String],
        market: &'a MarketData,
    ) -> Self {
        Self {
            idx,
            now,
            universe,
            market,
            long: None,
            flat: None,
            weights: HashMap::new(),
            max_weight: None,
        }
    }
}
