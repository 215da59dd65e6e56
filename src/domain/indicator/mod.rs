//! Technical indicator series.
//!
//! An [`IndicatorSeries`] is aligned one-to-one with the bar series it was
//! computed from; points inside the warmup window carry `valid: false` and
//! must be ignored by consumers.

pub mod sma;
pub mod volatility;

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub window: usize,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// The last two points, provided both are defined.
    ///
    /// Returns `(previous, current)` values, or `None` when the series is
    /// shorter than two points or either trailing point is still in warmup.
    pub fn trailing_pair(&self) -> Option<(f64, f64)> {
        let n = self.values.len();
        if n < 2 {
            return None;
        }
        let prev = &self.values[n - 2];
        let cur = &self.values[n - 1];
        if prev.valid && cur.valid {
            Some((prev.value, cur.value))
        } else {
            None
        }
    }
}
