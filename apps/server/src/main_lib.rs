use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use stockfolio_core::portfolio::{InMemoryPortfolioStore, PortfolioService, PortfolioStore};
use stockfolio_core::refresh::{ProgressStore, RefreshService};
use stockfolio_market_data::{MarketDataConfig, ProviderChain};

use crate::config::Config;

pub struct AppState {
    pub portfolio_service: Arc<PortfolioService>,
    pub refresh_service: Arc<RefreshService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let store: Arc<dyn PortfolioStore> = Arc::new(InMemoryPortfolioStore::new());
    let chain = Arc::new(ProviderChain::from_config(&MarketDataConfig {
        finnhub_api_key: config.finnhub_api_key.clone(),
        alpha_vantage_api_key: config.stock_api_key.clone(),
        alpha_vantage_base_url: config.stock_api_base_url.clone(),
    }));
    let progress = Arc::new(ProgressStore::new());

    let portfolio_service = Arc::new(PortfolioService::new(store.clone()));
    let refresh_service = Arc::new(RefreshService::new(store, chain, progress));

    Arc::new(AppState {
        portfolio_service,
        refresh_service,
    })
}
