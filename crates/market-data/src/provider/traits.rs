//! Quote provider trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;

/// Trait for latest-price quote providers.
///
/// Implement this trait to add support for a new quote source. The fallback
/// chain tries providers in its configured order and short-circuits on the
/// first success.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable provider name, used in error reports and logs.
    fn id(&self) -> &'static str;

    /// Fetch the latest quote for a stored symbol.
    ///
    /// The symbol may already carry an exchange suffix (`.NSE`, `.BSE`);
    /// each provider maps it to its own vendor symbol format before the
    /// request. A zero or missing price must be reported as
    /// [`MarketDataError::NoPriceData`], never as a valid quote.
    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, MarketDataError>;
}
