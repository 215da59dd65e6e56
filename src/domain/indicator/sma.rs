//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1] ..= C[i]). Warmup: first (n-1) bars are
//! invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], window: usize) -> IndicatorSeries {
    if window == 0 || bars.is_empty() {
        return IndicatorSeries {
            window,
            values: Vec::new(),
        };
    }

    let mut values = Vec::with_capacity(bars.len());
    let warmup = window - 1;
    let mut running = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        running += bar.close;
        if i >= window {
            running -= bars[i - window].close;
        }

        let valid = i >= warmup;
        let value = if valid { running / window as f64 } else { 0.0 };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            valid,
            value,
        });
    }

    IndicatorSeries { window, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                ticker: "TEST".into(),
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(10, i as u32, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[3].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn sma_basic_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_sma(&bars, 3);

        assert_relative_eq!(series.values[2].value, 20.0, epsilon = 1e-10);
        assert_relative_eq!(series.values[3].value, 30.0, epsilon = 1e-10);
        assert_relative_eq!(series.values[4].value, 40.0, epsilon = 1e-10);
    }

    #[test]
    fn sma_window_1_is_identity() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&bars, 1);

        for (point, bar) in series.values.iter().zip(&bars) {
            assert!(point.valid);
            assert_relative_eq!(point.value, bar.close, epsilon = 1e-10);
        }
    }

    #[test]
    fn sma_constant_prices() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0]);
        let series = calculate_sma(&bars, 2);

        for point in &series.values[1..] {
            assert_relative_eq!(point.value, 100.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 3);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_window_0() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_window_longer_than_series() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 5);
        assert_eq!(series.values.len(), 2);
        assert!(series.values.iter().all(|p| !p.valid));
    }
}
