//! Universe parsing and validation.
//!
//! Parses code lists from configuration and validates that each code has
//! price data loaded before the pipeline runs.

use crate::domain::market::MarketData;
use tracing::warn;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct Universe {
    pub codes: Vec<String>,
}

impl Universe {
    pub fn count(&self) -> usize {
        self.codes.len()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),

    #[error("no code in the universe has price data")]
    AllCodesFailed,
}

pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if seen.contains(&code) {
            return Err(UniverseError::DuplicateCode(code));
        }
        seen.insert(code.clone());
        codes.push(code);
    }

    Ok(codes)
}

/// Keep the codes backed by loaded price data, in config order. Codes
/// without data are skipped with a warning; an all-skipped universe is an
/// error.
pub fn validate_universe(
    market: &MarketData,
    codes: Vec<String>,
) -> Result<Universe, UniverseError> {
    let mut valid_codes = Vec::new();
    let mut skipped = 0usize;

    for code in codes {
        if market.has_series(&code) {
            valid_codes.push(code);
        } else {
            warn!(%code, "skipping code with no price data");
            skipped += 1;
        }
    }

    if valid_codes.is_empty() {
        return Err(UniverseError::AllCodesFailed);
    }

    if skipped > 0 {
        warn!(
            kept = valid_codes.len(),
            skipped, "universe reduced during validation"
        );
    }

    Ok(Universe { codes: valid_codes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ohlcv::OhlcvBar;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn market_with(codes: &[&str]) -> MarketData {
        let mut bars = HashMap::new();
        for code in codes {
            bars.insert(
                code.to_string(),
                vec![OhlcvBar {
                    code: code.to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 1,
                }],
            );
        }
        MarketData::from_bars(bars)
    }

    #[test]
    fn parse_codes_basic() {
        let result = parse_codes("CBA,BHP,WBC,NAB").unwrap();
        assert_eq!(result, vec!["CBA", "BHP", "WBC", "NAB"]);
    }

    #[test]
    fn parse_codes_with_whitespace() {
        let result = parse_codes("  CBA , BHP ,WBC,  NAB  ").unwrap();
        assert_eq!(result, vec!["CBA", "BHP", "WBC", "NAB"]);
    }

    #[test]
    fn parse_codes_uppercases() {
        let result = parse_codes("cba,bhp").unwrap();
        assert_eq!(result, vec!["CBA", "BHP"]);
    }

    #[test]
    fn parse_codes_single() {
        let result = parse_codes("CBA").unwrap();
        assert_eq!(result, vec!["CBA"]);
    }

    #[test]
    fn parse_codes_empty_token() {
        let result = parse_codes("CBA,,BHP");
        assert!(matches!(result, Err(UniverseError::EmptyToken)));
    }

    #[test]
    fn parse_codes_duplicate() {
        let result = parse_codes("CBA,BHP,CBA");
        assert!(matches!(result, Err(UniverseError::DuplicateCode(s)) if s == "CBA"));
    }

    #[test]
    fn validate_keeps_backed_codes_in_order() {
        let market = market_with(&["CBA", "BHP"]);
        let universe =
            validate_universe(&market, vec!["CBA".into(), "BHP".into()]).unwrap();
        assert_eq!(universe.codes, vec!["CBA", "BHP"]);
        assert_eq!(universe.count(), 2);
    }

    #[test]
    fn validate_skips_unbacked_codes() {
        let market = market_with(&["CBA"]);
        let universe =
            validate_universe(&market, vec!["CBA".into(), "GHOST".into()]).unwrap();
        assert_eq!(universe.codes, vec!["CBA"]);
    }

    #[test]
    fn validate_all_skipped_is_an_error() {
        let market = market_with(&[]);
        let result = validate_universe(&market, vec!["GHOST".into()]);
        assert!(matches!(result, Err(UniverseError::AllCodesFailed)));
    }
}
