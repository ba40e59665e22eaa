//! Market data fetching for the portfolio tracker.
//!
//! Provides three independent quote providers (Finnhub, Yahoo Finance,
//! Alpha Vantage) behind a common [`QuoteProvider`] trait, and a
//! [`ProviderChain`] that tries them in priority order with per-provider
//! failure accounting.

mod chain;
mod errors;
mod models;
pub mod provider;

pub use chain::{MarketDataConfig, ProviderChain};
pub use errors::MarketDataError;
pub use models::{PriceQuote, ProviderAvailability};
pub use provider::QuoteProvider;
