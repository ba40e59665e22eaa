//! Finnhub quote provider.
//!
//! Fetches the current price from the `/quote` endpoint. Finnhub uses the
//! Yahoo-style exchange suffixes for Indian listings (`.NS` for NSE, `.BO`
//! for BSE), so stored symbols are translated before the request.
//!
//! API documentation: https://finnhub.io/docs/api

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "Finnhub";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Response from the `/quote` endpoint.
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price. Finnhub returns 0 for unknown symbols instead of
    /// an error.
    c: Option<f64>,
}

pub struct FinnhubProvider {
    client: Client,
    api_key: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    /// Map a stored symbol to Finnhub's vendor format.
    ///
    /// No suffix defaults to NSE; `.BSE`/`.NSE` are translated to the
    /// `.BO`/`.NS` alphabet Finnhub shares with Yahoo.
    fn map_symbol(symbol: &str) -> String {
        if !symbol.contains('.') {
            format!("{}.NS", symbol)
        } else if symbol.contains(".BSE") {
            symbol.replace(".BSE", ".BO")
        } else if symbol.contains(".NSE") {
            symbol.replace(".NSE", ".NS")
        } else {
            symbol.to_string()
        }
    }
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        let vendor_symbol = Self::map_symbol(symbol);
        debug!("Fetching price for {} ({}) from Finnhub", symbol, vendor_symbol);

        let response = self
            .client
            .get(format!("{}/quote", BASE_URL))
            .header("X-Finnhub-Token", &self.api_key)
            .query(&[("symbol", vendor_symbol.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::Timeout {
                        provider: PROVIDER_ID.to_string(),
                    }
                } else {
                    MarketDataError::ProviderError {
                        provider: PROVIDER_ID.to_string(),
                        message: format!("Request failed: {}", e),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let quote: QuoteResponse = response.json().await.map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote response: {}", e),
            }
        })?;

        let price = quote
            .c
            .filter(|&c| c != 0.0)
            .and_then(Decimal::from_f64)
            .ok_or_else(|| MarketDataError::NoPriceData {
                provider: PROVIDER_ID.to_string(),
            })?;

        debug!("Finnhub: fetched {} at {}", symbol, price);

        Ok(PriceQuote {
            price,
            as_of: Utc::now(),
            source: PROVIDER_ID.to_string(),
        })
    }
}
