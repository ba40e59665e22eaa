//! Portfolio CRUD and lot management.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use super::portfolio_errors::PortfolioError;
use super::portfolio_model::{
    Lot, LotUpdate, NewLot, NewPortfolio, Portfolio, PortfolioUpdate,
};
use super::portfolio_store::PortfolioStore;

pub struct PortfolioService {
    store: Arc<dyn PortfolioStore>,
}

impl PortfolioService {
    pub fn new(store: Arc<dyn PortfolioStore>) -> Self {
        Self { store }
    }

    pub async fn list_portfolios(&self, owner_id: &str) -> Result<Vec<Portfolio>, PortfolioError> {
        self.store.find_by_owner(owner_id).await
    }

    pub async fn get_portfolio(
        &self,
        owner_id: &str,
        portfolio_id: &str,
    ) -> Result<Portfolio, PortfolioError> {
        self.store
            .find_one(owner_id, portfolio_id)
            .await?
            .ok_or(PortfolioError::NotFound)
    }

    /// Create a portfolio. Names are unique per owner.
    pub async fn create_portfolio(
        &self,
        owner_id: &str,
        input: NewPortfolio,
        now: DateTime<Utc>,
    ) -> Result<Portfolio, PortfolioError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(PortfolioError::InvalidInput(
                "Portfolio name is required".to_string(),
            ));
        }
        if self.store.find_by_name(owner_id, name).await?.is_some() {
            return Err(PortfolioError::DuplicateName);
        }

        let portfolio = Portfolio::new(owner_id, input, now);
        self.store.save(&portfolio).await?;
        debug!("Created portfolio '{}' for {}", portfolio.name, owner_id);
        Ok(portfolio)
    }

    pub async fn update_portfolio(
        &self,
        owner_id: &str,
        portfolio_id: &str,
        update: PortfolioUpdate,
    ) -> Result<Portfolio, PortfolioError> {
        let mut portfolio = self.get_portfolio(owner_id, portfolio_id).await?;

        if let Some(name) = update.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(PortfolioError::InvalidInput(
                    "Portfolio name is required".to_string(),
                ));
            }
            if name != portfolio.name {
                if self.store.find_by_name(owner_id, &name).await?.is_some() {
                    return Err(PortfolioError::DuplicateName);
                }
                portfolio.name = name;
            }
        }
        if let Some(description) = update.description {
            portfolio.description = description.trim().to_string();
        }

        self.store.save(&portfolio).await?;
        Ok(portfolio)
    }

    pub async fn delete_portfolio(
        &self,
        owner_id: &str,
        portfolio_id: &str,
    ) -> Result<(), PortfolioError> {
        if !self.store.delete(owner_id, portfolio_id).await? {
            return Err(PortfolioError::NotFound);
        }
        Ok(())
    }

    /// Append a lot to a portfolio. The new lot starts unpriced.
    pub async fn add_lot(
        &self,
        owner_id: &str,
        portfolio_id: &str,
        input: NewLot,
    ) -> Result<Portfolio, PortfolioError> {
        validate_lot_fields(
            &input.symbol,
            &input.full_name,
            &input.isin,
            input.quantity,
            input.purchase_amount,
        )?;

        let mut portfolio = self.get_portfolio(owner_id, portfolio_id).await?;
        portfolio.lots.push(Lot::new(input));
        self.store.save(&portfolio).await?;
        Ok(portfolio)
    }

    /// Edit a lot in place. Any edit clears the lot's valuation, so stale
    /// derived figures can never outlive the fields they came from.
    pub async fn update_lot(
        &self,
        owner_id: &str,
        portfolio_id: &str,
        lot_id: &str,
        update: LotUpdate,
    ) -> Result<Portfolio, PortfolioError> {
        let mut portfolio = self.get_portfolio(owner_id, portfolio_id).await?;
        let lot = portfolio
            .lots
            .iter_mut()
            .find(|lot| lot.id == lot_id)
            .ok_or(PortfolioError::LotNotFound)?;

        if let Some(symbol) = update.symbol {
            lot.symbol = symbol.trim().to_uppercase();
        }
        if let Some(short_name) = update.short_name {
            lot.short_name = short_name.trim().to_string();
        }
        if let Some(full_name) = update.full_name {
            lot.full_name = full_name.trim().to_string();
        }
        if let Some(isin) = update.isin {
            lot.isin = isin.trim().to_uppercase();
        }
        if let Some(purchase_date) = update.purchase_date {
            lot.purchase_date = purchase_date;
        }
        if let Some(quantity) = update.quantity {
            lot.quantity = quantity;
        }
        if let Some(purchase_amount) = update.purchase_amount {
            lot.purchase_amount = purchase_amount;
        }

        validate_lot_fields(
            &lot.symbol,
            &lot.full_name,
            &lot.isin,
            lot.quantity,
            lot.purchase_amount,
        )?;
        lot.valuation = None;

        self.store.save(&portfolio).await?;
        Ok(portfolio)
    }

    pub async fn delete_lot(
        &self,
        owner_id: &str,
        portfolio_id: &str,
        lot_id: &str,
    ) -> Result<Portfolio, PortfolioError> {
        let mut portfolio = self.get_portfolio(owner_id, portfolio_id).await?;
        let before = portfolio.lots.len();
        portfolio.lots.retain(|lot| lot.id != lot_id);
        if portfolio.lots.len() == before {
            return Err(PortfolioError::LotNotFound);
        }
        self.store.save(&portfolio).await?;
        Ok(portfolio)
    }
}

fn validate_lot_fields(
    symbol: &str,
    full_name: &str,
    isin: &str,
    quantity: Decimal,
    purchase_amount: Decimal,
) -> Result<(), PortfolioError> {
    if symbol.trim().is_empty() {
        return Err(PortfolioError::InvalidInput(
            "Stock symbol is required".to_string(),
        ));
    }
    if full_name.trim().is_empty() {
        return Err(PortfolioError::InvalidInput(
            "Stock name is required".to_string(),
        ));
    }
    if isin.trim().is_empty() {
        return Err(PortfolioError::InvalidInput(
            "ISIN is required".to_string(),
        ));
    }
    if quantity <= Decimal::ZERO {
        return Err(PortfolioError::InvalidInput(
            "Quantity must be positive".to_string(),
        ));
    }
    if purchase_amount <= Decimal::ZERO {
        return Err(PortfolioError::InvalidInput(
            "Purchase amount must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::portfolio_store::InMemoryPortfolioStore;
    use crate::portfolio::valuation::revalue_lot;
    use rust_decimal_macros::dec;

    fn service() -> PortfolioService {
        PortfolioService::new(Arc::new(InMemoryPortfolioStore::new()))
    }

    fn new_lot(symbol: &str) -> NewLot {
        NewLot {
            symbol: symbol.to_string(),
            short_name: symbol.to_string(),
            full_name: format!("{symbol} Ltd"),
            isin: "INE000A01001".to_string(),
            purchase_date: Utc::now(),
            quantity: dec!(10),
            purchase_amount: dec!(10000),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name_per_owner() {
        let service = service();
        let input = NewPortfolio {
            name: "Growth".to_string(),
            description: String::new(),
        };

        service
            .create_portfolio("alice", input.clone(), Utc::now())
            .await
            .unwrap();
        let err = service
            .create_portfolio("alice", input.clone(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::DuplicateName));

        // Same name under a different owner is fine.
        service
            .create_portfolio("bob", input, Utc::now())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let err = service()
            .create_portfolio(
                "alice",
                NewPortfolio {
                    name: "   ".to_string(),
                    description: String::new(),
                },
                Utc::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_add_lot_validates_quantity() {
        let service = service();
        let portfolio = service
            .create_portfolio(
                "alice",
                NewPortfolio {
                    name: "Growth".to_string(),
                    description: String::new(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let mut bad = new_lot("TCS");
        bad.quantity = dec!(0);
        let err = service
            .add_lot("alice", &portfolio.id, bad)
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_update_lot_clears_valuation() {
        let service = service();
        let portfolio = service
            .create_portfolio(
                "alice",
                NewPortfolio {
                    name: "Growth".to_string(),
                    description: String::new(),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        let mut portfolio = service
            .add_lot("alice", &portfolio.id, new_lot("TCS"))
            .await
            .unwrap();

        // Price the lot, then push it back through the store.
        let now = Utc::now();
        revalue_lot(&mut portfolio.lots[0], dec!(1100), now, now);
        service.store.save(&portfolio).await.unwrap();
        let lot_id = portfolio.lots[0].id.clone();

        let updated = service
            .update_lot(
                "alice",
                &portfolio.id,
                &lot_id,
                LotUpdate {
                    quantity: Some(dec!(20)),
                    ..LotUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.lots[0].quantity, dec!(20));
        assert!(updated.lots[0].valuation.is_none());
    }

    #[tokio::test]
    async fn test_delete_lot_unknown_id() {
        let service = service();
        let portfolio = service
            .create_portfolio(
                "alice",
                NewPortfolio {
                    name: "Growth".to_string(),
                    description: String::new(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let err = service
            .delete_lot("alice", &portfolio.id, "missing")
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::LotNotFound));
    }

    #[tokio::test]
    async fn test_get_portfolio_for_wrong_owner_is_not_found() {
        let service = service();
        let portfolio = service
            .create_portfolio(
                "alice",
                NewPortfolio {
                    name: "Growth".to_string(),
                    description: String::new(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        let err = service
            .get_portfolio("bob", &portfolio.id)
            .await
            .unwrap_err();
        assert!(matches!(err, PortfolioError::NotFound));
    }
}
