//! Shared models for the market data crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A normalized latest-price quote.
///
/// Every provider adapter maps its heterogeneous response into this shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Current market price (never zero; zero is reported as no-data)
    pub price: Decimal,

    /// Instant the price was fetched
    pub as_of: DateTime<Utc>,

    /// Human-readable provider name (e.g. "Finnhub")
    pub source: String,
}

/// Which adapters are configured, for the diagnostics endpoint.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderAvailability {
    pub finnhub: bool,
    pub yahoo_finance: bool,
    pub alpha_vantage: bool,
}
