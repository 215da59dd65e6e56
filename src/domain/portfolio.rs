//! Portfolio ledger: cash, signed holdings, and margin-aware valuation.
//!
//! Holdings are signed share counts (positive long, negative short); a
//! ticker never stores a zero entry. `short_entries` tracks the
//! volume-weighted entry price of each open short and contains exactly the
//! tickers with negative holdings. `total_value` is derived state: it is
//! only meaningful immediately after [`Portfolio::update_total_value`] ran
//! with current prices.

use std::collections::HashMap;
use std::fmt;

/// Fresh portfolios start with this cash balance.
pub const DEFAULT_INITIAL_CASH: f64 = 10_000.0;

/// Fraction of short notional reserved as margin collateral.
pub const MARGIN_REQUIREMENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSide {
    Long,
    Short,
    None,
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => write!(f, "LONG"),
            PositionSide::Short => write!(f, "SHORT"),
            PositionSide::None => write!(f, "NONE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub holdings: HashMap<String, i64>,
    pub short_entries: HashMap<String, f64>,
    pub total_value: f64,
    pub margin_requirement: f64,
}

impl Default for Portfolio {
    fn default() -> Self {
        Portfolio::new(DEFAULT_INITIAL_CASH)
    }
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            holdings: HashMap::new(),
            short_entries: HashMap::new(),
            total_value: initial_cash,
            margin_requirement: MARGIN_REQUIREMENT,
        }
    }

    /// Signed position for a ticker, 0 when absent.
    pub fn get_position(&self, ticker: &str) -> i64 {
        self.holdings.get(ticker).copied().unwrap_or(0)
    }

    pub fn position_side(&self, ticker: &str) -> PositionSide {
        match self.get_position(ticker) {
            q if q > 0 => PositionSide::Long,
            q if q < 0 => PositionSide::Short,
            _ => PositionSide::None,
        }
    }

    /// Total shares held long across all tickers.
    pub fn long_shares(&self) -> i64 {
        self.holdings.values().filter(|&&q| q > 0).sum()
    }

    /// Total shares owed short across all tickers, as a positive count.
    pub fn short_shares(&self) -> i64 {
        self.holdings
            .values()
            .filter(|&&q| q < 0)
            .map(|q| -q)
            .sum()
    }

    /// Execute a buy. Covers any existing short before opening a long.
    ///
    /// Covering realizes `(entry - price) * |short|` into cash, clears the
    /// short records, and consumes part of the requested quantity; the
    /// residual long purchase is then checked against cash in one step.
    /// When that residual is unaffordable the call returns false, but the
    /// cover has already happened and stands; only the additional long
    /// leg fails.
    pub fn execute_buy(&mut self, ticker: &str, quantity: i64, price: f64) -> bool {
        if quantity <= 0 || price <= 0.0 {
            return false;
        }

        let current = self.get_position(ticker);
        let mut quantity = quantity;

        if current < 0 {
            let entry = self
                .short_entries
                .get(ticker)
                .copied()
                .unwrap_or(price);
            self.cash += (entry - price) * (-current) as f64;
            self.short_entries.remove(ticker);
            self.holdings.remove(ticker);
            // Covering consumes |current| shares of the request.
            quantity = (quantity + current).max(0);
        }

        let cost = quantity as f64 * price;
        if cost > self.cash {
            return false;
        }

        self.cash -= cost;
        if quantity > 0 {
            let entry = self.holdings.entry(ticker.to_string()).or_insert(0);
            *entry += quantity;
            if *entry == 0 {
                self.holdings.remove(ticker);
            }
        }

        self.update_total_value(&HashMap::from([(ticker.to_string(), price)]));
        true
    }

    /// Execute a sell. Closes any long first; a remaining quantity opens
    /// or extends a short when `allow_short` is set.
    ///
    /// The short leg requires margin of `quantity * price *
    /// margin_requirement`. When margin is insufficient the call returns
    /// false, but a long-closing leg already applied in this call stands;
    /// partial success is possible and is not rolled back.
    pub fn execute_sell(
        &mut self,
        ticker: &str,
        quantity: i64,
        price: f64,
        allow_short: bool,
    ) -> bool {
        if quantity <= 0 || price <= 0.0 {
            return false;
        }

        let current = self.get_position(ticker);
        let mut quantity = quantity;

        if current > 0 {
            let sold = quantity.min(current);
            self.cash += sold as f64 * price;
            let remaining = current - sold;
            if remaining == 0 {
                self.holdings.remove(ticker);
            } else {
                self.holdings.insert(ticker.to_string(), remaining);
            }
            quantity -= sold;
        }

        if quantity > 0 && allow_short {
            let margin_required = quantity as f64 * price * self.margin_requirement;
            if margin_required > self.cash {
                return false;
            }

            let existing_short = (-self.get_position(ticker)).max(0);
            let entry = match self.short_entries.get(ticker) {
                None => price,
                Some(&prev) => {
                    let total = existing_short + quantity;
                    (existing_short as f64 * prev + quantity as f64 * price) / total as f64
                }
            };
            self.short_entries.insert(ticker.to_string(), entry);
            self.holdings
                .insert(ticker.to_string(), self.get_position(ticker) - quantity);
            self.cash -= margin_required;
        }

        self.update_total_value(&HashMap::from([(ticker.to_string(), price)]));
        true
    }

    /// Close any position (long or short) for a ticker at the given price.
    ///
    /// Residual holdings and short-entry records are force-deleted even if
    /// the closing call failed on cash insufficiency.
    pub fn close_all_positions(&mut self, ticker: &str, price: f64) {
        let Some(&quantity) = self.holdings.get(ticker) else {
            return;
        };
        if quantity > 0 {
            self.execute_sell(ticker, quantity, price, true);
        } else {
            self.execute_buy(ticker, -quantity, price);
        }
        self.holdings.remove(ticker);
        self.short_entries.remove(ticker);
    }

    /// Recompute `total_value` from cash, holdings and the supplied prices.
    ///
    /// Longs contribute `qty * price`; shorts contribute the margin held
    /// plus unrealized profit. Tickers missing from the price map are
    /// valued at 0.
    pub fn update_total_value(&mut self, prices: &HashMap<String, f64>) {
        if self.holdings.is_empty() {
            self.total_value = self.cash;
            return;
        }

        let mut value = self.cash;
        for (ticker, &quantity) in &self.holdings {
            let price = prices.get(ticker).copied().unwrap_or(0.0);
            if quantity > 0 {
                value += quantity as f64 * price;
            } else {
                let entry = self.short_entries.get(ticker).copied().unwrap_or(price);
                let margin_held = (-quantity) as f64 * price * self.margin_requirement;
                let unrealized = (entry - price) * (-quantity) as f64;
                value += margin_held + unrealized;
            }
        }
        self.total_value = value;
    }

    /// Market value of holdings under the supplied prices: long notional
    /// plus, for shorts, margin held and unrealized profit.
    pub fn holdings_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let mut value = 0.0;
        for (ticker, &quantity) in &self.holdings {
            let price = prices.get(ticker).copied().unwrap_or(0.0);
            if quantity > 0 {
                value += quantity as f64 * price;
            } else {
                let entry = self.short_entries.get(ticker).copied().unwrap_or(price);
                value += (-quantity) as f64 * price * self.margin_requirement
                    + (entry - price) * (-quantity) as f64;
            }
        }
        value
    }
}
