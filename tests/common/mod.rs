#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use papertrader::domain::error::PapertraderError;
use papertrader::domain::market::MarketStatus;
pub use papertrader::domain::ohlcv::OhlcvBar;
use papertrader::ports::data_port::MarketDataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub bars: HashMap<String, Vec<OhlcvBar>>,
    pub statuses: HashMap<String, MarketStatus>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: HashMap::new(),
            statuses: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    /// Register bars for a ticker; its market defaults to open.
    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.bars.insert(ticker.to_string(), bars);
        self.statuses.entry(ticker.to_string()).or_insert_with(|| {
            MarketStatus::open("Market closes in 120 minutes", Some(120))
        });
        self
    }

    pub fn with_status(mut self, ticker: &str, status: MarketStatus) -> Self {
        self.statuses.insert(ticker.to_string(), status);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self.statuses.entry(ticker.to_string()).or_insert_with(|| {
            MarketStatus::open("Market closes in 120 minutes", Some(120))
        });
        self
    }
}

impl MarketDataPort for MockDataPort {
    fn fetch_history(
        &self,
        ticker: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<OhlcvBar>, PapertraderError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(PapertraderError::Data {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.bars.get(ticker).cloned().unwrap_or_default())
    }

    fn market_status(&self, ticker: &str) -> MarketStatus {
        self.statuses
            .get(ticker)
            .cloned()
            .unwrap_or_else(|| MarketStatus::closed("Market closed"))
    }
}

pub fn timestamp(minute: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(minute)
}

pub fn make_bars(ticker: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            ticker: ticker.to_string(),
            timestamp: timestamp(i as i64),
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

/// Declining series whose final bar jumps, firing a BUY crossover for
/// SMA(2) against SMA(3).
pub fn buy_crossover_closes() -> Vec<f64> {
    vec![100.0, 98.0, 96.0, 94.0, 92.0, 90.0, 88.0, 104.0]
}

/// Climbing series whose final bar drops, firing a SELL crossover for
/// SMA(2) against SMA(3).
pub fn sell_crossover_closes() -> Vec<f64> {
    vec![100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0, 96.0]
}
