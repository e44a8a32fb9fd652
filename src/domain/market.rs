//! Aligned price history shared by every pipeline step.
//!
//! Bars arrive per code; the table aligns every code to the union of all
//! bar dates. Rows where a code has no bar hold NaN, which downstream
//! indicator arithmetic treats as "never fires".

use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

/// One instrument's price series, index-aligned to [`MarketData::dates`].
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

impl PriceSeries {
    fn nan_filled(len: usize) -> Self {
        Self {
            open: vec![f64::NAN; len],
            high: vec![f64::NAN; len],
            low: vec![f64::NAN; len],
            close: vec![f64::NAN; len],
        }
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarketData {
    dates: Vec<NaiveDate>,
    series: HashMap<String, PriceSeries>,
    date_index: HashMap<NaiveDate, usize>,
}

impl MarketData {
    /// Build the unified timeline from per-code bar lists and align each
    /// code's series to it.
    pub fn from_bars(bars_by_code: HashMap<String, Vec<OhlcvBar>>) -> Self {
        let unique_dates: BTreeSet<NaiveDate> = bars_by_code
            .values()
            .flat_map(|bars| bars.iter().map(|bar| bar.date))
            .collect();
        let dates: Vec<NaiveDate> = unique_dates.into_iter().collect();
        let date_index: HashMap<NaiveDate, usize> = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| (date, i))
            .collect();

        let mut series = HashMap::new();
        for (code, bars) in bars_by_code {
            let mut aligned = PriceSeries::nan_filled(dates.len());
            for bar in &bars {
                let row = date_index[&bar.date];
                aligned.open[row] = bar.open;
                aligned.high[row] = bar.high;
                aligned.low[row] = bar.low;
                aligned.close[row] = bar.close;
            }
            series.insert(code, aligned);
        }

        Self {
            dates,
            series,
            date_index,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn series(&self, code: &str) -> Option<&PriceSeries> {
        self.series.get(code)
    }

    pub fn has_series(&self, code: &str) -> bool {
        self.series.contains_key(code)
    }

    pub fn date_row(&self, date: NaiveDate) -> Option<usize> {
        self.date_index.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}
