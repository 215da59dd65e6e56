//! Crossover trading signal.

use crate::domain::indicator::IndicatorSeries;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Detect a moving-average crossover between two aligned series.
///
/// Only the trailing two points of each series matter: short crossing from
/// below to above long is Buy, the mirror is Sell. Equality at either
/// timestep is not a crossover. Series without two defined trailing points
/// yield Hold.
pub fn generate_signal(short: &IndicatorSeries, long: &IndicatorSeries) -> Signal {
    let (Some((prev_short, cur_short)), Some((prev_long, cur_long))) =
        (short.trailing_pair(), long.trailing_pair())
    else {
        return Signal::Hold;
    };

    if prev_short < prev_long && cur_short > cur_long {
        Signal::Buy
    } else if prev_short > prev_long && cur_short < cur_long {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::IndicatorPoint;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> IndicatorSeries {
        IndicatorSeries {
            window: 1,
            values: values
                .iter()
                .enumerate()
                .map(|(i, &value)| IndicatorPoint {
                    timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                        .unwrap()
                        .and_hms_opt(10, i as u32, 0)
                        .unwrap(),
                    valid: true,
                    value,
                })
                .collect(),
        }
    }

    fn series_with_warmup(values: &[f64], warmup: usize) -> IndicatorSeries {
        let mut s = series(values);
        for point in s.values.iter_mut().take(warmup) {
            point.valid = false;
        }
        s
    }

    #[test]
    fn short_crossing_above_long_is_buy() {
        let short = series(&[1.0, 2.0, 3.0]);
        let long = series(&[3.0, 2.0, 1.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Buy);
    }

    #[test]
    fn short_crossing_below_long_is_sell() {
        let short = series(&[3.0, 2.0, 1.0]);
        let long = series(&[1.0, 2.0, 3.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Sell);
    }

    #[test]
    fn flat_tie_is_hold() {
        let short = series(&[1.0, 1.0]);
        let long = series(&[1.0, 1.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn equality_at_current_step_is_hold() {
        // Short rises to meet long exactly; strict inequality fails.
        let short = series(&[1.0, 2.0]);
        let long = series(&[2.0, 2.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn equality_at_previous_step_is_hold() {
        let short = series(&[2.0, 3.0]);
        let long = series(&[2.0, 2.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn already_above_is_hold() {
        let short = series(&[3.0, 4.0]);
        let long = series(&[1.0, 2.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn too_short_series_is_hold() {
        let short = series(&[1.0]);
        let long = series(&[2.0]);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn warmup_points_do_not_count() {
        // The long series' previous point is still warming up.
        let short = series(&[1.0, 2.0, 3.0]);
        let long = series_with_warmup(&[3.0, 2.0, 1.0], 2);
        assert_eq!(generate_signal(&short, &long), Signal::Hold);
    }

    #[test]
    fn earlier_history_is_irrelevant() {
        // Same trailing pair, wildly different history: same signal.
        let a = series(&[100.0, -50.0, 1.0, 3.0]);
        let b = series(&[1.0, 1.0, 1.0, 3.0]);
        let long = series(&[0.0, 0.0, 2.0, 2.0]);
        assert_eq!(generate_signal(&a, &long), generate_signal(&b, &long));
    }

    #[test]
    fn display_labels() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::Sell.to_string(), "SELL");
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }
}
