//! Signal expression parser.
//!
//! Recursive descent over the grammar
//!
//! ```text
//! signal   := ('cross_up' | 'cross_down' | 'gt' | 'lt') '(' operand ',' operand ')'
//! operand  := series | number
//! series   := 'open' | 'high' | 'low' | 'close'
//!           | ('ma' | 'ema' | 'rsi') '(' series ',' integer ')'
//! ```
//!
//! The only resolvable leaves are the four price-series names and the
//! whitelisted function calls; any other identifier is rejected here, with
//! a character offset, before anything is evaluated.

use crate::domain::error::ParseError;
use crate::domain::expr::{Operand, PriceField, SeriesExpr, SignalExpr};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => Err(ParseError {
                message: format!("expected '{}', found '{}'", expected, ch),
                position: self.pos,
            }),
            None => Err(ParseError {
                message: format!("expected '{}', found end of input", expected),
                position: self.pos,
            }),
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    fn consume_word(&mut self) -> String {
        self.skip_whitespace();
        let word = self.peek_word();
        if self
            .remaining()
            .chars()
            .next()
            .map(|c| c.is_alphanumeric() || c == '_')
            .unwrap_or(false)
        {
            self.pos += word.len();
        }
        word
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected number".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_period(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return Err(ParseError {
                message: "expected integer period".to_string(),
                position: start,
            });
        }

        let num_str = &self.input[start..self.pos];
        let period = num_str.parse::<usize>().map_err(|_| ParseError {
            message: format!("invalid integer: {}", num_str),
            position: start,
        })?;

        if period == 0 {
            return Err(ParseError {
                message: "period must be at least 1".to_string(),
                position: start,
            });
        }

        Ok(period)
    }

    fn parse_series(&mut self) -> Result<SeriesExpr, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let word = self.consume_word();

        match word.as_str() {
            "open" => Ok(SeriesExpr::Price(PriceField::Open)),
            "high" => Ok(SeriesExpr::Price(PriceField::High)),
            "low" => Ok(SeriesExpr::Price(PriceField::Low)),
            "close" => Ok(SeriesExpr::Price(PriceField::Close)),
            "ma" | "ema" | "rsi" => {
                self.expect_char('(')?;
                let input = Box::new(self.parse_series()?);
                self.expect_char(',')?;
                let period = self.parse_period()?;
                self.expect_char(')')?;
                Ok(match word.as_str() {
                    "ma" => SeriesExpr::Ma { input, period },
                    "ema" => SeriesExpr::Ema { input, period },
                    _ => SeriesExpr::Rsi { input, period },
                })
            }
            _ => Err(ParseError {
                message: format!(
                    "unknown identifier '{}': expected open, high, low, close, ma, ema, or rsi",
                    word
                ),
                position: start,
            }),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        self.skip_whitespace();

        if self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '-' || ch == '.')
        {
            let num = self.parse_number()?;
            return Ok(Operand::Constant(num));
        }

        Ok(Operand::Series(self.parse_series()?))
    }

    fn parse_signal(&mut self) -> Result<SignalExpr, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let word = self.consume_word();

        match word.as_str() {
            "cross_up" | "cross_down" | "gt" | "lt" => {
                self.expect_char('(')?;
                let left = self.parse_operand()?;
                self.expect_char(',')?;
                let right = self.parse_operand()?;
                self.expect_char(')')?;
                Ok(match word.as_str() {
                    "cross_up" => SignalExpr::CrossUp { left, right },
                    "cross_down" => SignalExpr::CrossDown { left, right },
                    "gt" => SignalExpr::Gt { left, right },
                    _ => SignalExpr::Lt { left, right },
                })
            }
            "open" | "high" | "low" | "close" | "ma" | "ema" | "rsi" => Err(ParseError {
                message: format!(
                    "expression must yield a signal: wrap '{}' in cross_up, cross_down, gt, or lt",
                    word
                ),
                position: start,
            }),
            _ => Err(ParseError {
                message: format!(
                    "expected signal expression (cross_up, cross_down, gt, lt), found '{}'",
                    word
                ),
                position: start,
            }),
        }
    }

    fn parse(&mut self) -> Result<SignalExpr, ParseError> {
        let expr = self.parse_signal()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return Err(ParseError {
                message: format!("unexpected input after expression: '{}'", self.remaining()),
                position: self.pos,
            });
        }
        Ok(expr)
    }
}

pub fn parse(input: &str) -> Result<SignalExpr, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
