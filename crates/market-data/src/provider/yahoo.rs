//! Yahoo Finance quote provider.
//!
//! Uses the public chart endpoint and reads `regularMarketPrice` from the
//! chart metadata. Needs no API key, which makes it the keyless fallback in
//! the chain.

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

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const PROVIDER_ID: &str = "Yahoo Finance";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Yahoo rejects requests without a browser-looking user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

pub struct YahooProvider {
    client: Client,
}

impl YahooProvider {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    /// Map a stored symbol to Yahoo's vendor format (`.NS`/`.BO` suffixes,
    /// defaulting to NSE when no exchange is given).
    fn map_symbol(symbol: &str) -> String {
        if symbol.contains(".BSE") {
            symbol.replace(".BSE", ".BO")
        } else if symbol.contains(".NSE") {
            symbol.replace(".NSE", ".NS")
        } else if !symbol.contains('.') {
            format!("{}.NS", symbol)
        } else {
            symbol.to_string()
        }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        let vendor_symbol = Self::map_symbol(symbol);
        debug!(
            "Fetching price for {} ({}) from Yahoo Finance",
            symbol, vendor_symbol
        );

        let response = self
            .client
            .get(format!("{}/{}", BASE_URL, vendor_symbol))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
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
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
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

        let chart: ChartResponse = response.json().await.map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse chart response: {}", e),
            }
        })?;

        let price = chart
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta.regular_market_price)
            .filter(|&p| p != 0.0)
            .and_then(Decimal::from_f64)
            .ok_or_else(|| MarketDataError::NoPriceData {
                provider: PROVIDER_ID.to_string(),
            })?;

        debug!("Yahoo Finance: fetched {} at {}", symbol, price);

        Ok(PriceQuote {
            price,
            as_of: Utc::now(),
            source: PROVIDER_ID.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_symbol_translates_bse_suffix() {
        assert_eq!(YahooProvider::map_symbol("TCS.BSE"), "TCS.BO");
    }

    #[test]
    fn test_map_symbol_translates_nse_suffix() {
        assert_eq!(YahooProvider::map_symbol("INFY.NSE"), "INFY.NS");
    }

    #[test]
    fn test_map_symbol_defaults_to_nse() {
        assert_eq!(YahooProvider::map_symbol("RELIANCE"), "RELIANCE.NS");
    }

    #[test]
    fn test_chart_response_parsing() {
        let json = r#"{
            "chart": {
                "result": [
                    {
                        "meta": {
                            "currency": "INR",
                            "symbol": "RELIANCE.NS",
                            "regularMarketPrice": 2843.55
                        }
                    }
                ],
                "error": null
            }
        }"#;

        let response: ChartResponse = serde_json::from_str(json).unwrap();
        let price = response.chart.result.unwrap()[0]
            .meta
            .regular_market_price;
        assert_eq!(price, Some(2843.55));
    }

    #[test]
    fn test_chart_response_missing_result_is_no_data() {
        let json = r#"{"chart": {"result": null, "error": {"code": "Not Found"}}}"#;
        let response: ChartResponse = serde_json::from_str(json).unwrap();
        assert!(response.chart.result.is_none());
    }
}
