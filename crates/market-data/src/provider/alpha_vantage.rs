//! Alpha Vantage quote provider.
//!
//! Uses the `TIME_SERIES_DAILY` function and reads the close of the most
//! recent trading day. Alpha Vantage only lists the BSE alphabet for Indian
//! symbols, so NSE-suffixed symbols are translated to `.BSE`.
//!
//! The free tier is heavily rate limited; the vendor signals this with a
//! "Note" payload mentioning call frequency rather than an HTTP status.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::PriceQuote;
use crate::provider::QuoteProvider;

const PROVIDER_ID: &str = "Alpha Vantage";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Error Message")]
    error_message: Option<String>,

    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyBar>>,
}

#[derive(Debug, Deserialize)]
struct DailyBar {
    #[serde(rename = "4. close")]
    close: Option<String>,
}

pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String, base_url: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
        }
    }

    /// Map a stored symbol to Alpha Vantage's vendor format. The vendor only
    /// knows the `.BSE` suffix for Indian listings, so NSE symbols are
    /// translated and bare symbols default to BSE.
    fn map_symbol(symbol: &str) -> String {
        if symbol.contains(".NSE") {
            symbol.replace(".NSE", ".BSE")
        } else if !symbol.contains(".BSE") && !symbol.contains('.') {
            format!("{}.BSE", symbol)
        } else {
            symbol.to_string()
        }
    }
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceQuote, MarketDataError> {
        let vendor_symbol = Self::map_symbol(symbol);
        debug!(
            "Fetching price for {} ({}) from Alpha Vantage",
            symbol, vendor_symbol
        );

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", "TIME_SERIES_DAILY"),
                ("symbol", vendor_symbol.as_str()),
                ("outputsize", "compact"),
                ("apikey", self.api_key.as_str()),
            ])
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
        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        let series: DailySeriesResponse = response.json().await.map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse daily series: {}", e),
            }
        })?;

        if let Some(message) = series.error_message {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message,
            });
        }

        if let Some(note) = &series.note {
            if note.contains("call frequency") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
        }

        let time_series = series
            .time_series
            .filter(|ts| !ts.is_empty())
            .ok_or_else(|| MarketDataError::NoPriceData {
                provider: PROVIDER_ID.to_string(),
            })?;

        // Dates are ISO formatted, so a plain descending sort yields the
        // latest trading day first.
        let latest_date = time_series
            .keys()
            .max()
            .cloned()
            .ok_or_else(|| MarketDataError::NoPriceData {
                provider: PROVIDER_ID.to_string(),
            })?;

        let price = time_series
            .get(&latest_date)
            .and_then(|bar| bar.close.as_deref())
            .and_then(|close| close.parse::<Decimal>().ok())
            .filter(|price| !price.is_zero())
            .ok_or_else(|| MarketDataError::NoPriceData {
                provider: PROVIDER_ID.to_string(),
            })?;

        debug!("Alpha Vantage: fetched {} at {}", symbol, price);

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
    use rust_decimal_macros::dec;

    #[test]
    fn test_map_symbol_translates_nse_to_bse() {
        assert_eq!(AlphaVantageProvider::map_symbol("INFY.NSE"), "INFY.BSE");
    }

    #[test]
    fn test_map_symbol_defaults_to_bse() {
        assert_eq!(AlphaVantageProvider::map_symbol("RELIANCE"), "RELIANCE.BSE");
    }

    #[test]
    fn test_map_symbol_keeps_bse_suffix() {
        assert_eq!(AlphaVantageProvider::map_symbol("TCS.BSE"), "TCS.BSE");
    }

    #[test]
    fn test_daily_series_parsing_picks_latest_close() {
        let json = r#"{
            "Meta Data": {"2. Symbol": "TCS.BSE"},
            "Time Series (Daily)": {
                "2024-01-03": {"1. open": "3710.0", "4. close": "3721.40", "5. volume": "100"},
                "2024-01-02": {"1. open": "3690.0", "4. close": "3695.10", "5. volume": "90"}
            }
        }"#;

        let series: DailySeriesResponse = serde_json::from_str(json).unwrap();
        let time_series = series.time_series.unwrap();
        let latest = time_series.keys().max().cloned().unwrap();
        assert_eq!(latest, "2024-01-03");

        let close = time_series[&latest].close.as_deref().unwrap();
        assert_eq!(close.parse::<Decimal>().unwrap(), dec!(3721.40));
    }

    #[test]
    fn test_daily_series_vendor_error_message() {
        let json = r#"{"Error Message": "Invalid API call."}"#;
        let series: DailySeriesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(series.error_message.as_deref(), Some("Invalid API call."));
        assert!(series.time_series.is_none());
    }

    #[test]
    fn test_daily_series_rate_limit_note() {
        let json = r#"{"Note": "Thank you! Our standard API call frequency is 25 requests per day."}"#;
        let series: DailySeriesResponse = serde_json::from_str(json).unwrap();
        assert!(series.note.unwrap().contains("call frequency"));
    }
}
