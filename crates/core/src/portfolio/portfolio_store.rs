//! Keyed portfolio persistence.
//!
//! The service layer talks to [`PortfolioStore`] only, so the backing
//! store can be swapped without touching domain logic. The bundled
//! implementation keeps everything in process memory.

use async_trait::async_trait;
use dashmap::DashMap;

use super::portfolio_errors::PortfolioError;
use super::portfolio_model::Portfolio;

#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// All portfolios belonging to an owner.
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>, PortfolioError>;

    /// A single portfolio, scoped to its owner.
    async fn find_one(
        &self,
        owner_id: &str,
        portfolio_id: &str,
    ) -> Result<Option<Portfolio>, PortfolioError>;

    /// Owner-scoped lookup by display name, used for uniqueness checks.
    async fn find_by_name(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Portfolio>, PortfolioError>;

    /// Insert or replace the full record.
    async fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError>;

    /// Remove a portfolio. Returns whether anything was deleted.
    async fn delete(&self, owner_id: &str, portfolio_id: &str) -> Result<bool, PortfolioError>;
}

/// In-memory store keyed by portfolio id.
#[derive(Default)]
pub struct InMemoryPortfolioStore {
    portfolios: DashMap<String, Portfolio>,
}

impl InMemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortfolioStore for InMemoryPortfolioStore {
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Portfolio>, PortfolioError> {
        let mut result: Vec<Portfolio> = self
            .portfolios
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }

    async fn find_one(
        &self,
        owner_id: &str,
        portfolio_id: &str,
    ) -> Result<Option<Portfolio>, PortfolioError> {
        Ok(self
            .portfolios
            .get(portfolio_id)
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_name(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<Portfolio>, PortfolioError> {
        Ok(self
            .portfolios
            .iter()
            .find(|entry| entry.owner_id == owner_id && entry.name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, portfolio: &Portfolio) -> Result<(), PortfolioError> {
        self.portfolios
            .insert(portfolio.id.clone(), portfolio.clone());
        Ok(())
    }

    async fn delete(&self, owner_id: &str, portfolio_id: &str) -> Result<bool, PortfolioError> {
        let owned = self
            .portfolios
            .get(portfolio_id)
            .map(|entry| entry.owner_id == owner_id)
            .unwrap_or(false);
        if !owned {
            return Ok(false);
        }
        Ok(self.portfolios.remove(portfolio_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::portfolio_model::NewPortfolio;
    use chrono::Utc;

    fn make(owner: &str, name: &str) -> Portfolio {
        Portfolio::new(
            owner,
            NewPortfolio {
                name: name.to_string(),
                description: String::new(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_find_one_is_owner_scoped() {
        let store = InMemoryPortfolioStore::new();
        let portfolio = make("alice", "Growth");
        store.save(&portfolio).await.unwrap();

        assert!(store
            .find_one("alice", &portfolio.id)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_one("bob", &portfolio.id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_refuses_foreign_owner() {
        let store = InMemoryPortfolioStore::new();
        let portfolio = make("alice", "Growth");
        store.save(&portfolio).await.unwrap();

        assert!(!store.delete("bob", &portfolio.id).await.unwrap());
        assert!(store.delete("alice", &portfolio.id).await.unwrap());
        assert!(!store.delete("alice", &portfolio.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_owner_filters_and_orders() {
        let store = InMemoryPortfolioStore::new();
        store.save(&make("alice", "First")).await.unwrap();
        store.save(&make("alice", "Second")).await.unwrap();
        store.save(&make("bob", "Other")).await.unwrap();

        let mine = store.find_by_owner("alice").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|p| p.owner_id == "alice"));
    }
}
