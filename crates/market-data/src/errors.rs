//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching quotes from external providers.
///
/// Display messages are provider-free; the fallback chain prefixes each
/// recorded failure with the adapter's name (`"<provider>: <message>"`) so
/// per-symbol failure reports stay diagnosable after the chain has run.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider returned no usable price for the symbol.
    /// A zero or absent price is "no data", never a valid quote of zero.
    #[error("No price data available")]
    NoPriceData {
        /// The provider that returned no data
        provider: String,
    },

    /// The provider rate limited the request.
    #[error("API rate limit exceeded")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Request timed out")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (non-2xx, vendor error message,
    /// malformed payload).
    #[error("{message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// Every configured adapter was tried and every one failed.
    ///
    /// The message joins the individual `"<provider>: <message>"` failures so
    /// callers can recover each reason for diagnostics.
    #[error("All providers failed. {0}")]
    AllProvidersFailed(String),

    /// No adapters are configured at all.
    #[error("No quote providers configured")]
    NoProvidersConfigured,
}

impl MarketDataError {
    /// The provider this error originated from, when there is a single one.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::NoPriceData { provider }
            | Self::RateLimited { provider }
            | Self::Timeout { provider }
            | Self::ProviderError { provider, .. } => Some(provider),
            Self::AllProvidersFailed(_) | Self::NoProvidersConfigured => None,
        }
    }
}
