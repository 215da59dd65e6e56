//! Simulation session state.
//!
//! All mutable per-session state lives in an explicit [`SessionContext`]
//! passed to the tick engine, never in ambient globals. Timestamps are
//! injected by the caller so the domain stays clock-free.

use chrono::NaiveDateTime;

/// Most recent trade-log entries shown to the user.
pub const TRADE_LOG_DISPLAY_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeLogEntry {
    pub timestamp: NaiveDateTime,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub trading_active: bool,
    pub start_time: Option<NaiveDateTime>,
    pub last_update: Option<NaiveDateTime>,
    pub total_trades: u64,
    trade_log: Vec<TradeLogEntry>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: NaiveDateTime) {
        self.trading_active = true;
        self.start_time = Some(now);
    }

    pub fn stop(&mut self) {
        self.trading_active = false;
        self.start_time = None;
        self.last_update = None;
    }

    /// Record a fill, newest first.
    pub fn record_trade(&mut self, now: NaiveDateTime, message: impl Into<String>) {
        self.trade_log.insert(
            0,
            TradeLogEntry {
                timestamp: now,
                message: message.into(),
            },
        );
        self.total_trades += 1;
    }

    /// Newest-first view of the log, capped at `limit` entries.
    pub fn recent_trades(&self, limit: usize) -> &[TradeLogEntry] {
        &self.trade_log[..self.trade_log.len().min(limit)]
    }

    pub fn runtime_seconds(&self, now: NaiveDateTime) -> Option<i64> {
        self.start_time
            .map(|start| (now - start).num_seconds().max(0))
    }

    pub fn trades_per_hour(&self, now: NaiveDateTime) -> f64 {
        match self.runtime_seconds(now) {
            Some(secs) if secs > 0 => self.total_trades as f64 * 3_600.0 / secs as f64,
            _ => 0.0,
        }
    }
}
