//! Price-history access port trait.

use crate::domain::error::SteptraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// All bars for one code, sorted by date.
    fn fetch_ohlcv(&self, code: &str) -> Result<Vec<OhlcvBar>, SteptraderError>;
}
