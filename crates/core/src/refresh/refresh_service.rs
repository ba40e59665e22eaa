//! Price refresh orchestrator.
//!
//! Partitions a portfolio's lots into fetch vs cache via the market-hours
//! policy, acknowledges immediately, then runs the external calls in a
//! detached task that publishes progress snapshots as it goes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{error, info};
use serde::Serialize;

use stockfolio_market_data::{PriceQuote, ProviderAvailability, ProviderChain};

use crate::constants::{DELAY_BETWEEN_CALLS, PROGRESS_RETENTION};
use crate::market_hours::{is_market_open, needs_refresh};
use crate::portfolio::valuation::{refresh_valuation, revalue_lot};
use crate::portfolio::{Portfolio, PortfolioError, PortfolioStore};

use super::progress_model::{ProgressKey, ProgressSnapshot, RefreshStatus};
use super::progress_store::ProgressStore;

/// Time source. Injected so batch behavior is reproducible in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Immediate acknowledgement returned before the batch runs.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshStarted {
    pub message: String,
    pub progress_key: String,
    pub total: usize,
    pub cached: usize,
}

/// Outcome of a single diagnostic price lookup.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPriceReport {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_data: Option<PriceQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub market_status: &'static str,
    pub available_apis: ProviderAvailability,
}

impl TestPriceReport {
    pub fn succeeded(&self) -> bool {
        self.price_data.is_some()
    }
}

pub struct RefreshService {
    store: Arc<dyn PortfolioStore>,
    chain: Arc<ProviderChain>,
    progress: Arc<ProgressStore>,
    call_delay: Duration,
    retention: Duration,
    clock: Clock,
}

impl RefreshService {
    pub fn new(
        store: Arc<dyn PortfolioStore>,
        chain: Arc<ProviderChain>,
        progress: Arc<ProgressStore>,
    ) -> Self {
        Self {
            store,
            chain,
            progress,
            call_delay: DELAY_BETWEEN_CALLS,
            retention: PROGRESS_RETENTION,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start a refresh for one portfolio.
    ///
    /// Rejects the call when a refresh for the same key is already
    /// processing. Lots whose cached price is still valid are revalued
    /// right away; the rest are fetched by a detached batch task. Returns
    /// as soon as the batch is spawned.
    pub async fn start_refresh(
        self: Arc<Self>,
        owner_id: &str,
        portfolio_id: &str,
    ) -> Result<RefreshStarted, PortfolioError> {
        let key = ProgressKey::new(owner_id, portfolio_id);
        let now = (self.clock)();

        // Claim the key before the portfolio load. The load suspends, so a
        // plain check here would let two racing calls both pass. The claim
        // snapshot is a placeholder, overwritten once the batch is sized.
        if !self
            .progress
            .try_begin(key.clone(), ProgressSnapshot::processing(0, 0, now))
        {
            return Err(PortfolioError::RefreshInProgress);
        }

        let mut portfolio = match self.store.find_one(owner_id, portfolio_id).await {
            Ok(Some(portfolio)) => portfolio,
            Ok(None) => {
                self.progress.remove(&key);
                return Err(PortfolioError::NotFound);
            }
            Err(e) => {
                self.progress.remove(&key);
                return Err(e);
            }
        };
        let mut pending: Vec<usize> = Vec::new();
        let mut cached = 0usize;

        for (index, lot) in portfolio.lots.iter_mut().enumerate() {
            let decision = needs_refresh(lot, now);
            if decision.needs_update {
                info!("{} needs update: {}", lot.symbol, decision.reason);
                pending.push(index);
            } else {
                info!("{} using cache: {}", lot.symbol, decision.reason);
                refresh_valuation(lot, now);
                cached += 1;
            }
        }

        let total = pending.len();
        self.progress
            .insert(key.clone(), ProgressSnapshot::processing(total, cached, now));

        let service = Arc::clone(&self);
        let batch_key = key.clone();
        tokio::spawn(async move {
            service
                .run_batch(batch_key, portfolio, pending, cached, now)
                .await;
        });

        Ok(RefreshStarted {
            message: "Price fetch started".to_string(),
            progress_key: key.to_string(),
            total,
            cached,
        })
    }

    async fn run_batch(
        self: Arc<Self>,
        key: ProgressKey,
        mut portfolio: Portfolio,
        pending: Vec<usize>,
        cached: usize,
        started_at: DateTime<Utc>,
    ) {
        let total = pending.len();
        let mut errors: Vec<String> = Vec::new();

        for (attempted, lot_index) in pending.iter().copied().enumerate() {
            let symbol = portfolio.lots[lot_index].symbol.clone();

            let mut snapshot = ProgressSnapshot::processing(total, cached, started_at);
            snapshot.completed = attempted;
            snapshot.current = Some(symbol.clone());
            snapshot.errors = errors.clone();
            self.progress.insert(key.clone(), snapshot);

            match self.chain.fetch_price(&symbol).await {
                Ok(quote) => {
                    let now = (self.clock)();
                    revalue_lot(
                        &mut portfolio.lots[lot_index],
                        quote.price,
                        quote.as_of,
                        now,
                    );
                }
                Err(e) => {
                    errors.push(format!("{symbol}: {e}"));
                }
            }

            // Rate-limit spacing, pointless after the final call.
            if attempted + 1 < total && !self.call_delay.is_zero() {
                tokio::time::sleep(self.call_delay).await;
            }
        }

        portfolio.last_price_update = Some(started_at);

        match self.persist_and_reload(&key, &portfolio).await {
            Ok(reloaded) => {
                let mut snapshot = ProgressSnapshot::processing(total, cached, started_at);
                snapshot.status = RefreshStatus::Completed;
                snapshot.completed = total;
                snapshot.errors = errors;
                snapshot.finished_at = Some((self.clock)());
                snapshot.portfolio = Some(reloaded);
                self.progress.insert(key.clone(), snapshot);
            }
            Err(e) => {
                error!("Refresh batch for {} failed: {}", key, e);
                let mut snapshot = ProgressSnapshot::processing(total, cached, started_at);
                snapshot.status = RefreshStatus::Error;
                snapshot.completed = total;
                snapshot.errors = errors;
                snapshot.finished_at = Some((self.clock)());
                snapshot.message = Some(e.to_string());
                self.progress.insert(key.clone(), snapshot);
            }
        }

        self.progress.evict_after(key, self.retention);
    }

    async fn persist_and_reload(
        &self,
        key: &ProgressKey,
        portfolio: &Portfolio,
    ) -> Result<Portfolio, PortfolioError> {
        self.store.save(portfolio).await?;
        self.store
            .find_one(&key.owner_id, &key.portfolio_id)
            .await?
            .ok_or(PortfolioError::NotFound)
    }

    /// Current snapshot for a key, if any refresh is running or recently
    /// finished.
    pub fn progress(&self, owner_id: &str, portfolio_id: &str) -> Option<ProgressSnapshot> {
        self.progress.get(&ProgressKey::new(owner_id, portfolio_id))
    }

    /// Run the chain once for a symbol and report the outcome together
    /// with market status and adapter availability.
    pub async fn test_price(&self, symbol: &str) -> TestPriceReport {
        let market_status = if is_market_open((self.clock)()) {
            "open"
        } else {
            "closed"
        };
        let available_apis = self.chain.availability();

        match self.chain.fetch_price(symbol).await {
            Ok(quote) => TestPriceReport {
                symbol: symbol.to_string(),
                price_data: Some(quote),
                message: Some("Test successful"),
                error: None,
                market_status,
                available_apis,
            },
            Err(e) => TestPriceReport {
                symbol: symbol.to_string(),
                price_data: None,
                message: None,
                error: Some(e.to_string()),
                market_status,
                available_apis,
            },
        }
    }
}
