//! Signal expression AST.
//!
//! The type split keeps ill-kinded expressions unrepresentable: series
//! positions only admit price leaves and smoothing calls, comparison
//! positions admit a series or a numeric constant, and the top level is
//! always a signal-producing form.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
}

impl PriceField {
    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesExpr {
    Price(PriceField),
    Ma { input: Box<SeriesExpr>, period: usize },
    Ema { input: Box<SeriesExpr>, period: usize },
    Rsi { input: Box<SeriesExpr>, period: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Series(SeriesExpr),
    Constant(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalExpr {
    CrossUp { left: Operand, right: Operand },
    CrossDown { left: Operand, right: Operand },
    Gt { left: Operand, right: Operand },
    Lt { left: Operand, right: Operand },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_field_names() {
        assert_eq!(PriceField::Open.name(), "open");
        assert_eq!(PriceField::Close.name(), "close");
    }

    #[test]
    fn nested_series_expression() {
        let expr = SeriesExpr::Ma {
            input: Box::new(SeriesExpr::Price(PriceField::Close)),
            period: 5,
        };
        assert!(matches!(expr, SeriesExpr::Ma { period: 5, .. }));
    }

    #[test]
    fn signal_variants() {
        let cross = SignalExpr::CrossUp {
            left: Operand::Series(SeriesExpr::Price(PriceField::Close)),
            right: Operand::Constant(100.0),
        };
        assert!(matches!(cross, SignalExpr::CrossUp { .. }));

        let cmp = SignalExpr::Gt {
            left: Operand::Series(SeriesExpr::Rsi {
                input: Box::new(SeriesExpr::Price(PriceField::Close)),
                period: 14,
            }),
            right: Operand::Constant(70.0),
        };
        assert!(matches!(cmp, SignalExpr::Gt { .. }));
    }
}
