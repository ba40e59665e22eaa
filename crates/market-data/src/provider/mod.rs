mod alpha_vantage;
mod finnhub;
mod traits;
mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use finnhub::FinnhubProvider;
pub use traits::QuoteProvider;
pub use yahoo::YahooProvider;
