//! Date × instrument signal table.
//!
//! One row per timeline date, one column per instrument in universe order.
//! Cell values: 1 go long, -1 go flat, anything else selects into neither
//! bucket.

use chrono::NaiveDate;
use std::collections::HashMap;

pub const LONG_SIGNAL: i8 = 1;
pub const FLAT_SIGNAL: i8 = -1;

#[derive(Debug, Clone)]
pub struct SignalTable {
    dates: Vec<NaiveDate>,
    symbols: Vec<String>,
    columns: Vec<Vec<i8>>,
    date_index: HashMap<NaiveDate, usize>,
}

impl SignalTable {
    /// Zero-filled table over the given timeline and column order.
    pub fn new(dates: Vec<NaiveDate>, symbols: Vec<String>) -> Self {
        let date_index = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| (date, i))
            .collect();
        let columns = vec![vec![0; dates.len()]; symbols.len()];
        Self {
            dates,
            symbols,
            columns,
            date_index,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Replace a symbol's column. Returns false (and leaves the table
    /// untouched) if the symbol is unknown or the length is misaligned.
    pub fn set_column(&mut self, symbol: &str, values: Vec<i8>) -> bool {
        if values.len() != self.dates.len() {
            return false;
        }
        match self.symbols.iter().position(|s| s == symbol) {
            Some(col) => {
                self.columns[col] = values;
                true
            }
            None => false,
        }
    }

    pub fn value(&self, date: NaiveDate, symbol: &str) -> Option<i8> {
        let row = *self.date_index.get(&date)?;
        let col = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.columns[col][row])
    }

    /// The given date's row as (symbol, value) pairs in column order.
    pub fn day_slice(&self, date: NaiveDate) -> Option<Vec<(&str, i8)>> {
        let row = *self.date_index.get(&date)?;
        Some(
            self.symbols
                .iter()
                .zip(&self.columns)
                .map(|(symbol, column)| (symbol.as_str(), column[row]))
                .collect(),
        )
    }
}
