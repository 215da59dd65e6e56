//! JSON portfolio state adapter.
//!
//! Persists one document per portfolio:
//!
//! ```json
//! {
//!   "cash": 10000.0,
//!   "holdings": { "AAPL": 10 },
//!   "total_value": 10000.0,
//!   "short_positions": { "MSFT": 101.5 }
//! }
//! ```
//!
//! `short_positions` is optional on read for compatibility with files
//! written before margin accounting existed.

use crate::domain::error::PapertraderError;
use crate::domain::portfolio::Portfolio;
use crate::ports::state_port::StatePort;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct PortfolioState {
    cash: f64,
    holdings: HashMap<String, i64>,
    total_value: f64,
    #[serde(default)]
    short_positions: HashMap<String, f64>,
}

impl From<&Portfolio> for PortfolioState {
    fn from(portfolio: &Portfolio) -> Self {
        PortfolioState {
            cash: portfolio.cash,
            holdings: portfolio.holdings.clone(),
            total_value: portfolio.total_value,
            short_positions: portfolio.short_entries.clone(),
        }
    }
}

impl From<PortfolioState> for Portfolio {
    fn from(state: PortfolioState) -> Self {
        let mut portfolio = Portfolio::new(0.0);
        portfolio.cash = state.cash;
        portfolio.holdings = state.holdings;
        portfolio.total_value = state.total_value;
        portfolio.short_entries = state.short_positions;
        portfolio
    }
}

pub struct JsonStateAdapter {
    path: PathBuf,
    initial_cash: f64,
}

impl JsonStateAdapter {
    pub fn new(path: PathBuf, initial_cash: f64) -> Self {
        Self { path, initial_cash }
    }
}

impl StatePort for JsonStateAdapter {
    fn load(&self) -> Portfolio {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return Portfolio::new(self.initial_cash);
        };
        match serde_json::from_str::<PortfolioState>(&content) {
            Ok(state) => state.into(),
            Err(_) => Portfolio::new(self.initial_cash),
        }
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), PapertraderError> {
        let state = PortfolioState::from(portfolio);
        let content = serde_json::to_string(&state).map_err(|e| PapertraderError::State {
            reason: format!("failed to serialize portfolio: {}", e),
        })?;
        fs::write(&self.path, content).map_err(|e| PapertraderError::State {
            reason: format!("failed to write {}: {}", self.path.display(), e),
        })
    }

    fn reset(&self) -> Result<Portfolio, PapertraderError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| PapertraderError::State {
                reason: format!("failed to remove {}: {}", self.path.display(), e),
            })?;
        }
        Ok(Portfolio::new(self.initial_cash))
    }
}
