//! Simulation tick engine.
//!
//! One tick is a sequential pass over the selected tickers: fetch prices,
//! derive signal and sizing, mutate the ledger. Failures are isolated per
//! ticker so one bad feed never aborts the others. Market status gates
//! every trade; positions are force-closed shortly before the venue
//! closes and when the session stops.

use chrono::NaiveDateTime;

use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::volatility::{calculate_volatility, DEFAULT_VOLATILITY_WINDOW};
use crate::domain::ohlcv::{closes, last_close};
use crate::domain::portfolio::{Portfolio, PositionSide};
use crate::domain::session::SessionContext;
use crate::domain::signal::{generate_signal, Signal};
use crate::domain::sizing::{calculate_position_size, DEFAULT_RISK_FACTOR};
use crate::ports::data_port::MarketDataPort;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub volatility_window: usize,
    pub risk_factor: f64,
    pub allow_short: bool,
    /// Open positions are liquidated when the venue closes within this
    /// many minutes.
    pub preclose_minutes: i64,
    pub period: String,
    pub interval: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            short_window: 5,
            long_window: 15,
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            risk_factor: DEFAULT_RISK_FACTOR,
            allow_short: true,
            preclose_minutes: 10,
            period: "1d".to_string(),
            interval: "1m".to_string(),
        }
    }
}

/// Per-ticker view produced by a tick, after any trades applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub price: f64,
    pub volatility: f64,
    pub signal: Signal,
    pub position: i64,
    pub side: PositionSide,
    pub sized_shares: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub snapshots: Vec<TickerSnapshot>,
    pub skipped: Vec<SkippedTicker>,
}

/// Run one simulation tick over the selected tickers.
pub fn run_tick(
    portfolio: &mut Portfolio,
    session: &mut SessionContext,
    data: &dyn MarketDataPort,
    tickers: &[String],
    config: &EngineConfig,
    now: NaiveDateTime,
) -> TickReport {
    let mut report = TickReport::default();

    close_before_venue_close(portfolio, session, data, config, now, &mut report);

    if tickers.is_empty() {
        session.last_update = Some(now);
        return report;
    }

    // Each ticker trades against an equal share of current cash.
    let cash_per_ticker = portfolio.cash / tickers.len() as f64;

    for ticker in tickers {
        let status = data.market_status(ticker);
        if !status.is_open {
            report.skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: format!("market {}: {}", status.state, status.detail),
            });
            continue;
        }

        let bars = match data.fetch_history(ticker, &config.period, &config.interval) {
            Ok(bars) => bars,
            Err(e) => {
                report.skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let Some(price) = last_close(&bars) else {
            report.skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: "no data".to_string(),
            });
            continue;
        };

        let closes = closes(&bars);
        let short_sma = calculate_sma(&bars, config.short_window);
        let long_sma = calculate_sma(&bars, config.long_window);
        let volatility = calculate_volatility(&closes, config.volatility_window);
        let signal = generate_signal(&short_sma, &long_sma);

        let position = portfolio.get_position(ticker);
        let sized_shares =
            calculate_position_size(cash_per_ticker, price, volatility, config.risk_factor);

        match signal {
            Signal::Buy => {
                if position < 0 && portfolio.execute_buy(ticker, -position, price) {
                    session.record_trade(
                        now,
                        format!(
                            "COVER SHORT: {} shares of {} at ${:.2}",
                            -position, ticker, price
                        ),
                    );
                }
                if sized_shares > 0 && portfolio.execute_buy(ticker, sized_shares, price) {
                    session.record_trade(
                        now,
                        format!(
                            "BUY LONG: {} shares of {} at ${:.2}",
                            sized_shares, ticker, price
                        ),
                    );
                }
            }
            Signal::Sell => {
                if position > 0 && portfolio.execute_sell(ticker, position, price, true) {
                    session.record_trade(
                        now,
                        format!(
                            "SELL LONG: {} shares of {} at ${:.2}",
                            position, ticker, price
                        ),
                    );
                }
                if config.allow_short
                    && sized_shares > 0
                    && portfolio.execute_sell(ticker, sized_shares, price, true)
                {
                    session.record_trade(
                        now,
                        format!(
                            "SELL SHORT: {} shares of {} at ${:.2}",
                            sized_shares, ticker, price
                        ),
                    );
                }
            }
            Signal::Hold => {}
        }

        report.snapshots.push(TickerSnapshot {
            ticker: ticker.clone(),
            price,
            volatility,
            signal,
            position: portfolio.get_position(ticker),
            side: portfolio.position_side(ticker),
            sized_shares,
        });
    }

    session.last_update = Some(now);
    report
}

/// Force-close every open position at the latest fetched price.
///
/// Used when the session stops. Tickers whose price fetch fails are
/// returned; their records are left for a later defensive cleanup.
pub fn liquidate_all(
    portfolio: &mut Portfolio,
    session: &mut SessionContext,
    data: &dyn MarketDataPort,
    config: &EngineConfig,
    now: NaiveDateTime,
) -> Vec<SkippedTicker> {
    let mut failures = Vec::new();
    let held: Vec<String> = portfolio.holdings.keys().cloned().collect();

    for ticker in held {
        let price = match data.fetch_history(&ticker, &config.period, &config.interval) {
            Ok(bars) => last_close(&bars),
            Err(e) => {
                failures.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let Some(price) = price else {
            failures.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: "no data".to_string(),
            });
            continue;
        };

        let position = portfolio.get_position(&ticker);
        let side = portfolio.position_side(&ticker);
        portfolio.close_all_positions(&ticker, price);
        session.record_trade(
            now,
            format!(
                "Closed {} position: {} shares of {} at ${:.2}",
                side,
                position.abs(),
                ticker,
                price
            ),
        );
    }

    failures
}

fn close_before_venue_close(
    portfolio: &mut Portfolio,
    session: &mut SessionContext,
    data: &dyn MarketDataPort,
    config: &EngineConfig,
    now: NaiveDateTime,
    report: &mut TickReport,
) {
    let held: Vec<String> = portfolio.holdings.keys().cloned().collect();

    for ticker in held {
        let status = data.market_status(&ticker);
        let closing_soon = status.is_open
            && status
                .minutes_to_close
                .is_some_and(|m| m <= config.preclose_minutes);
        if !closing_soon {
            continue;
        }

        let position = portfolio.get_position(&ticker);
        if position == 0 {
            continue;
        }

        let price = match data.fetch_history(&ticker, &config.period, &config.interval) {
            Ok(bars) => last_close(&bars),
            Err(e) => {
                report.skipped.push(SkippedTicker {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let Some(price) = price else {
            report.skipped.push(SkippedTicker {
                ticker: ticker.clone(),
                reason: "no data".to_string(),
            });
            continue;
        };

        let side = portfolio.position_side(&ticker);
        portfolio.close_all_positions(&ticker, price);
        session.record_trade(
            now,
            format!(
                "PRE-CLOSE: Closed {} position: {} shares of {} at ${:.2}",
                side,
                position.abs(),
                ticker,
                price
            ),
        );
    }
}
