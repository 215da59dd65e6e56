//! Market data access port trait.

use crate::domain::error::PapertraderError;
use crate::domain::market::MarketStatus;
use crate::domain::ohlcv::OhlcvBar;

pub trait MarketDataPort {
    /// Fetch the price history for a ticker.
    ///
    /// An empty vec means the provider had no data ("skip this ticker this
    /// cycle"); `Err` means the provider itself failed.
    fn fetch_history(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<OhlcvBar>, PapertraderError>;

    /// Venue status for a ticker. Never fails: provider failures surface
    /// as [`crate::domain::market::MarketState::Error`].
    fn market_status(&self, ticker: &str) -> MarketStatus;
}
