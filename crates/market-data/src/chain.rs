//! Provider fallback chain.
//!
//! Tries the configured adapters in a fixed priority order (Finnhub, then
//! Yahoo Finance, then Alpha Vantage), short-circuiting on the first success
//! and accumulating per-provider failure reasons otherwise.

use std::sync::Arc;

use log::{info, warn};

use crate::errors::MarketDataError;
use crate::models::{PriceQuote, ProviderAvailability};
use crate::provider::{
    AlphaVantageProvider, FinnhubProvider, QuoteProvider, YahooProvider,
};

/// API credentials for the optional providers.
///
/// A missing key disables that adapter only, never the whole chain.
#[derive(Clone, Debug, Default)]
pub struct MarketDataConfig {
    /// Finnhub API key (primary provider).
    pub finnhub_api_key: Option<String>,
    /// Alpha Vantage API key (tertiary provider).
    pub alpha_vantage_api_key: Option<String>,
    /// Alpha Vantage base URL (tertiary provider).
    pub alpha_vantage_base_url: Option<String>,
}

/// Ordered fallback chain of quote providers.
pub struct ProviderChain {
    providers: Vec<Arc<dyn QuoteProvider>>,
    availability: ProviderAvailability,
}

impl ProviderChain {
    /// Build the chain from configuration.
    ///
    /// Adapters whose credentials are absent are skipped with a warning.
    /// Yahoo Finance needs no key and is always present.
    pub fn from_config(config: &MarketDataConfig) -> Self {
        let mut providers: Vec<Arc<dyn QuoteProvider>> = Vec::new();

        let finnhub = match &config.finnhub_api_key {
            Some(key) if !key.is_empty() => {
                providers.push(Arc::new(FinnhubProvider::new(key.clone())));
                true
            }
            _ => {
                warn!("Finnhub API key not configured, skipping adapter");
                false
            }
        };

        providers.push(Arc::new(YahooProvider::new()));

        let alpha_vantage = match (
            &config.alpha_vantage_api_key,
            &config.alpha_vantage_base_url,
        ) {
            (Some(key), Some(base_url)) if !key.is_empty() && !base_url.is_empty() => {
                providers.push(Arc::new(AlphaVantageProvider::new(
                    key.clone(),
                    base_url.clone(),
                )));
                true
            }
            _ => {
                warn!("Alpha Vantage not configured, skipping adapter");
                false
            }
        };

        info!(
            "Provider chain configured with {} adapters",
            providers.len()
        );

        Self {
            providers,
            availability: ProviderAvailability {
                finnhub,
                yahoo_finance: true,
                alpha_vantage,
            },
        }
    }

    /// Build a chain from an explicit, already-ordered provider list.
    ///
    /// Availability flags are derived from the supplied providers' ids, so
    /// diagnostics stay truthful for hand-built chains too.
    pub fn new(providers: Vec<Arc<dyn QuoteProvider>>) -> Self {
        let has = |id: &str| providers.iter().any(|provider| provider.id() == id);
        let availability = ProviderAvailability {
            finnhub: has("Finnhub"),
            yahoo_finance: has("Yahoo Finance"),
            alpha_vantage: has("Alpha Vantage"),
        };
        Self {
            providers,
            availability,
        }
    }

    /// Which adapters are configured, for the diagnostics endpoint.
    pub fn availability(&self) -> ProviderAvailability {
        self.availability
    }

    /// Fetch the latest price for a symbol, trying each adapter in order.
    ///
    /// Returns the first successful quote. When every adapter fails, the
    /// returned error message joins all collected `"<provider>: <message>"`
    /// failures.
    pub async fn fetch_price(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        if self.providers.is_empty() {
            return Err(MarketDataError::NoProvidersConfigured);
        }

        let mut failures: Vec<String> = Vec::new();

        for provider in &self.providers {
            match provider.fetch_quote(symbol).await {
                Ok(quote) => {
                    info!(
                        "Fetched {} at {} from {}",
                        symbol, quote.price, quote.source
                    );
                    return Ok(quote);
                }
                Err(e) => {
                    warn!(
                        "Provider '{}' failed for symbol '{}': {}. Trying next.",
                        provider.id(),
                        symbol,
                        e
                    );
                    failures.push(format!("{}: {}", provider.id(), e));
                }
            }
        }

        Err(MarketDataError::AllProvidersFailed(failures.join(", ")))
    }
}
