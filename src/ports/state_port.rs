//! Portfolio persistence port trait.

use crate::domain::error::PapertraderError;
use crate::domain::portfolio::Portfolio;

pub trait StatePort {
    /// Load the persisted portfolio.
    ///
    /// Missing or corrupt state falls back to a fresh default portfolio
    /// rather than failing the session.
    fn load(&self) -> Portfolio;

    /// Overwrite the persisted state with the full current portfolio.
    fn save(&self, portfolio: &Portfolio) -> Result<(), PapertraderError>;

    /// Remove any persisted state and return a fresh default portfolio.
    fn reset(&self) -> Result<Portfolio, PapertraderError>;
}
