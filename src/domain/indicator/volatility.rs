//! Rolling return volatility.
//!
//! Sample standard deviation of the most recent `window` percent returns
//! between consecutive closes. The window is capped to half the series
//! length so short intraday series still produce a value.

/// Substituted whenever the computation yields no defined result.
pub const DEFAULT_VOLATILITY: f64 = 0.01;

pub const DEFAULT_VOLATILITY_WINDOW: usize = 20;

pub fn calculate_volatility(closes: &[f64], window: usize) -> f64 {
    let window = window.min(closes.len() / 2);
    if window < 2 || closes.len() < 2 {
        return DEFAULT_VOLATILITY;
    }

    let returns: Vec<f64> = closes
        .windows(2)
        .map(|pair| (pair[1] - pair[0]) / pair[0])
        .collect();
    if returns.len() < window {
        return DEFAULT_VOLATILITY;
    }

    let tail = &returns[returns.len() - window..];
    let mean = tail.iter().sum::<f64>() / window as f64;
    let variance = tail
        .iter()
        .map(|r| {
            let diff = r - mean;
            diff * diff
        })
        .sum::<f64>()
        / (window - 1) as f64;
    let volatility = variance.sqrt();

    if volatility.is_finite() {
        volatility
    } else {
        DEFAULT_VOLATILITY
    }
}
