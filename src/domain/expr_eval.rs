//! Signal expression evaluation.
//!
//! Binds one instrument's aligned price series to the four price names and
//! reduces a [`SignalExpr`] to a fire/no-fire series over the timeline.
//! Scalar operands broadcast to the timeline length.

use crate::domain::expr::{Operand, PriceField, SeriesExpr, SignalExpr};
use crate::domain::indicator;
use crate::domain::market::PriceSeries;

pub fn evaluate(expr: &SignalExpr, prices: &PriceSeries) -> Vec<bool> {
    match expr {
        SignalExpr::CrossUp { left, right } => {
            indicator::cross_up(&resolve_operand(left, prices), &resolve_operand(right, prices))
        }
        SignalExpr::CrossDown { left, right } => indicator::cross_down(
            &resolve_operand(left, prices),
            &resolve_operand(right, prices),
        ),
        SignalExpr::Gt { left, right } => {
            indicator::gt(&resolve_operand(left, prices), &resolve_operand(right, prices))
        }
        SignalExpr::Lt { left, right } => {
            indicator::lt(&resolve_operand(left, prices), &resolve_operand(right, prices))
        }
    }
}

fn resolve_operand(operand: &Operand, prices: &PriceSeries) -> Vec<f64> {
    match operand {
        Operand::Series(series) => resolve_series(series, prices),
        Operand::Constant(v) => vec![*v; prices.len()],
    }
}

fn resolve_series(expr: &SeriesExpr, prices: &PriceSeries) -> Vec<f64> {
    match expr {
        SeriesExpr::Price(field) => match field {
            PriceField::Open => prices.open.clone(),
            PriceField::High => prices.high.clone(),
            PriceField::Low => prices.low.clone(),
            PriceField::Close => prices.close.clone(),
        },
        SeriesExpr::Ma { input, period } => {
            indicator::ma(&resolve_series(input, prices), *period)
        }
        SeriesExpr::Ema { input, period } => {
            indicator::ema(&resolve_series(input, prices), *period)
        }
        SeriesExpr::Rsi { input, period } => {
            indicator::rsi(&resolve_series(input, prices), *period)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::expr_parser::parse;

    fn flat_series(closes: &[f64]) -> PriceSeries {
        PriceSeries {
            open: closes.to_vec(),
            high: closes.to_vec(),
            low: closes.to_vec(),
            close: closes.to_vec(),
        }
    }

    #[test]
    fn gt_against_constant() {
        let prices = flat_series(&[95.0, 105.0, 99.0]);
        let expr = parse("gt(close, 100)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![false, true, false]);
    }

    #[test]
    fn lt_against_constant() {
        let prices = flat_series(&[95.0, 105.0, 99.0]);
        let expr = parse("lt(close, 100)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![true, false, true]);
    }

    #[test]
    fn cross_up_of_price_over_constant() {
        let prices = flat_series(&[95.0, 105.0, 110.0]);
        let expr = parse("cross_up(close, 100)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![false, true, false]);
    }

    #[test]
    fn moving_average_crossover() {
        // ma(close,1) is the close itself; ma(close,2) lags it, so an
        // upturn after a downturn produces a single cross_up fire
        let prices = flat_series(&[10.0, 8.0, 6.0, 9.0, 12.0]);
        let expr = parse("cross_up(ma(close, 1), ma(close, 2))").unwrap();
        let fired = evaluate(&expr, &prices);
        assert_eq!(fired, vec![false, false, false, true, false]);
    }

    #[test]
    fn warmup_rows_never_fire() {
        let prices = flat_series(&[10.0, 11.0, 12.0, 13.0]);
        let expr = parse("gt(ma(close, 3), 0)").unwrap();
        let fired = evaluate(&expr, &prices);
        assert_eq!(fired, vec![false, false, true, true]);
    }

    #[test]
    fn distinct_price_fields_are_bound() {
        let prices = PriceSeries {
            open: vec![1.0, 1.0],
            high: vec![10.0, 10.0],
            low: vec![0.5, 0.5],
            close: vec![5.0, 5.0],
        };
        let expr = parse("gt(high, close)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![true, true]);

        let expr = parse("lt(low, open)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![true, true]);
    }

    #[test]
    fn constant_broadcast_length() {
        let prices = flat_series(&[1.0, 2.0, 3.0]);
        let expr = parse("gt(5, close)").unwrap();
        assert_eq!(evaluate(&expr, &prices), vec![true, true, true]);
    }

    #[test]
    fn rsi_threshold_expression() {
        // strictly rising closes push RSI to 100 once warmed up
        let prices = flat_series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let expr = parse("gt(rsi(close, 3), 90)").unwrap();
        let fired = evaluate(&expr, &prices);
        assert_eq!(fired, vec![false, false, false, true, true]);
    }
}
