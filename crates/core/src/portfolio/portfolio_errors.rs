use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("Portfolio not found")]
    NotFound,

    #[error("Stock not found in portfolio")]
    LotNotFound,

    #[error("Portfolio with this name already exists")]
    DuplicateName,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Price fetch already in progress for this portfolio")]
    RefreshInProgress,

    #[error("Storage error: {0}")]
    Storage(String),
}
