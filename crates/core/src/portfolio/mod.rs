pub mod portfolio_errors;
pub mod portfolio_model;
pub mod portfolio_service;
pub mod portfolio_store;
pub mod valuation;

pub use portfolio_errors::PortfolioError;
pub use portfolio_model::{
    Lot, LotUpdate, LotValuation, NewLot, NewPortfolio, Portfolio, PortfolioUpdate, TaxBracket,
};
pub use portfolio_service::PortfolioService;
pub use portfolio_store::{InMemoryPortfolioStore, PortfolioStore};
