//! Configuration validation.
//!
//! Validates all simulator config fields before a session runs.

use crate::domain::error::PapertraderError;
use crate::ports::config_port::ConfigPort;

pub fn validate_simulator_config(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    validate_initial_cash(config)?;
    validate_tickers(config)?;
    validate_windows(config)?;
    validate_risk_factor(config)?;
    validate_tick_seconds(config)?;
    validate_limits(config)?;
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let value = config.get_float("portfolio", "initial_cash", 10_000.0);
    if value <= 0.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "portfolio".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_tickers(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let tickers = config.get_string("simulator", "tickers");
    match tickers {
        None => Err(PapertraderError::ConfigMissing {
            section: "simulator".to_string(),
            key: "tickers".to_string(),
        }),
        Some(s) if s.split(',').all(|t| t.trim().is_empty()) => {
            Err(PapertraderError::ConfigInvalid {
                section: "simulator".to_string(),
                key: "tickers".to_string(),
                reason: "at least one ticker is required".to_string(),
            })
        }
        Some(_) => Ok(()),
    }
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let short = config.get_int("strategy", "short_window", 5);
    let long = config.get_int("strategy", "long_window", 15);

    if short < 1 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "short_window".to_string(),
            reason: "short_window must be at least 1".to_string(),
        });
    }
    if long <= short {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "long_window".to_string(),
            reason: "long_window must be greater than short_window".to_string(),
        });
    }
    let volatility = config.get_int("strategy", "volatility_window", 20);
    if volatility < 2 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "volatility_window".to_string(),
            reason: "volatility_window must be at least 2".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_factor(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let value = config.get_float("strategy", "risk_factor", 0.02);
    if value <= 0.0 || value > 1.0 {
        return Err(PapertraderError::ConfigInvalid {
            section: "strategy".to_string(),
            key: "risk_factor".to_string(),
            reason: "risk_factor must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_tick_seconds(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let value = config.get_int("simulator", "tick_seconds", 60);
    if value < 1 {
        return Err(PapertraderError::ConfigInvalid {
            section: "simulator".to_string(),
            key: "tick_seconds".to_string(),
            reason: "tick_seconds must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn validate_limits(config: &dyn ConfigPort) -> Result<(), PapertraderError> {
    let max_requests = config.get_int("limits", "max_requests", 2);
    if max_requests < 1 {
        return Err(PapertraderError::ConfigInvalid {
            section: "limits".to_string(),
            key: "max_requests".to_string(),
            reason: "max_requests must be at least 1".to_string(),
        });
    }
    let window = config.get_int("limits", "window_seconds", 1);
    if window < 1 {
        return Err(PapertraderError::ConfigInvalid {
            section: "limits".to_string(),
            key: "window_seconds".to_string(),
            reason: "window_seconds must be at least 1".to_string(),
        });
    }
    Ok(())
}
