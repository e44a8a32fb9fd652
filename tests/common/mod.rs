#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use steptrader::domain::algo::Algo;
use steptrader::domain::context::StepContext;
use steptrader::domain::market::MarketData;
use steptrader::domain::ohlcv::OhlcvBar;

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn make_bar(code: &str, day: u32, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date: date(day),
        open: close,
        high: close,
        low: close,
        close,
        volume: 1000,
    }
}

/// Market where each code's closes start on day 1 and run consecutively.
pub fn make_market(closes_by_code: &[(&str, &[f64])]) -> MarketData {
    let mut bars = HashMap::new();
    for (code, closes) in closes_by_code {
        bars.insert(
            code.to_string(),
            closes
                .iter()
                .enumerate()
                .map(|(i, &close)| make_bar(code, (i + 1) as u32, close))
                .collect(),
        );
    }
    MarketData::from_bars(bars)
}

pub fn make_context<'a>(
    idx: usize,
    universe: &'a [String],
    market: &'a MarketData,
) -> StepContext<'a> {
    StepContext::new(idx, market.dates()[idx], universe, market)
}

pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

pub fn new_call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Stage that records its invocations into a shared log and returns a
/// fixed result.
pub struct Probe {
    label: &'static str,
    result: bool,
    run_always: Option<bool>,
    log: CallLog,
}

impl Probe {
    pub fn new(label: &'static str, result: bool, log: &CallLog) -> Box<Self> {
        Box::new(Self {
            label,
            result,
            run_always: None,
            log: Rc::clone(log),
        })
    }

    pub fn run_always(
        label: &'static str,
        result: bool,
        flag: bool,
        log: &CallLog,
    ) -> Box<Self> {
        Box::new(Self {
            label,
            result,
            run_always: Some(flag),
            log: Rc::clone(log),
        })
    }
}

impl Algo for Probe {
    fn name(&self) -> &'static str {
        self.label
    }

    fn run_always(&self) -> Option<bool> {
        self.run_always
    }

    fn execute(&mut self, _ctx: &mut StepContext<'_>) -> bool {
        self.log.borrow_mut().push(self.label);
        self.result
    }
}
