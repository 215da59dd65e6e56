//! CSV replay market data adapter.
//!
//! Reads recorded intraday bars from `<TICKER>.csv` files and replays them
//! as a live feed: the first fetch reveals a warmup window, every later
//! fetch reveals one more bar. Market status derives from replay progress
//! (remaining bars x bar interval), so a session naturally approaches its
//! close as the recording runs out.
//!
//! File format: `timestamp,open,high,low,close,volume` with timestamps as
//! `YYYY-MM-DD HH:MM:SS`, one header row.

use crate::domain::error::PapertraderError;
use crate::domain::market::MarketStatus;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDateTime;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvReplayAdapter {
    base_path: PathBuf,
    warmup_bars: usize,
    interval_minutes: i64,
    cache: RefCell<HashMap<String, Vec<OhlcvBar>>>,
    /// Bars already returned by fetches, per ticker.
    revealed: RefCell<HashMap<String, usize>>,
}

impl CsvReplayAdapter {
    pub fn new(base_path: PathBuf, warmup_bars: usize, interval_minutes: i64) -> Self {
        Self {
            base_path,
            warmup_bars,
            interval_minutes: interval_minutes.max(1),
            cache: RefCell::new(HashMap::new()),
            revealed: RefCell::new(HashMap::new()),
        }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }

    fn load(&self, ticker: &str) -> Result<Vec<OhlcvBar>, PapertraderError> {
        if let Some(bars) = self.cache.borrow().get(ticker) {
            return Ok(bars.clone());
        }

        let path = self.csv_path(ticker);
        let content = fs::read_to_string(&path).map_err(|e| PapertraderError::Data {
            ticker: ticker.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| PapertraderError::Data {
                ticker: ticker.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let timestamp_str = record.get(0).ok_or_else(|| PapertraderError::Data {
                ticker: ticker.to_string(),
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = NaiveDateTime::parse_from_str(timestamp_str, TIMESTAMP_FORMAT)
                .map_err(|e| PapertraderError::Data {
                    ticker: ticker.to_string(),
                    reason: format!("invalid timestamp: {}", e),
                })?;

            let numeric = |idx: usize, name: &str| -> Result<f64, PapertraderError> {
                record
                    .get(idx)
                    .ok_or_else(|| PapertraderError::Data {
                        ticker: ticker.to_string(),
                        reason: format!("missing {} column", name),
                    })?
                    .parse()
                    .map_err(|e| PapertraderError::Data {
                        ticker: ticker.to_string(),
                        reason: format!("invalid {} value: {}", name, e),
                    })
            };

            let open = numeric(1, "open")?;
            let high = numeric(2, "high")?;
            let low = numeric(3, "low")?;
            let close = numeric(4, "close")?;

            let volume: i64 = record
                .get(5)
                .ok_or_else(|| PapertraderError::Data {
                    ticker: ticker.to_string(),
                    reason: "missing volume column".into(),
                })?
                .parse()
                .map_err(|e| PapertraderError::Data {
                    ticker: ticker.to_string(),
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push(OhlcvBar {
                ticker: ticker.to_string(),
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        self.cache
            .borrow_mut()
            .insert(ticker.to_string(), bars.clone());
        Ok(bars)
    }

    fn revealed_count(&self, ticker: &str) -> usize {
        self.revealed.borrow().get(ticker).copied().unwrap_or(0)
    }
}

impl MarketDataPort for CsvReplayAdapter {
    fn fetch_history(
        &self,
        ticker: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<OhlcvBar>, PapertraderError> {
        let bars = self.load(ticker)?;
        if bars.is_empty() {
            return Ok(Vec::new());
        }

        // First fetch reveals the warmup window; each later fetch reveals
        // one more bar until the recording runs out.
        let revealed = self.revealed_count(ticker);
        let visible = if revealed == 0 {
            self.warmup_bars.clamp(1, bars.len())
        } else {
            (revealed + 1).min(bars.len())
        };
        self.revealed
            .borrow_mut()
            .insert(ticker.to_string(), visible);
        Ok(bars[..visible].to_vec())
    }

    fn market_status(&self, ticker: &str) -> MarketStatus {
        let bars = match self.load(ticker) {
            Ok(bars) => bars,
            Err(e) => return MarketStatus::error(e.to_string()),
        };
        if bars.is_empty() {
            return MarketStatus::closed("No data");
        }

        let remaining = (bars.len() - self.revealed_count(ticker)) as i64;
        if remaining == 0 {
            MarketStatus::closed("Market closed")
        } else {
            let minutes = remaining * self.interval_minutes;
            MarketStatus::open(format!("Market closes in {} minutes", minutes), Some(minutes))
        }
    }
}
