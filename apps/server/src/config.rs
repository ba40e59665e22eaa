/// Server configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: String,
    /// Finnhub API key. Absent means the primary adapter is disabled.
    pub finnhub_api_key: Option<String>,
    /// Alpha Vantage API key (tertiary adapter).
    pub stock_api_key: Option<String>,
    /// Alpha Vantage base URL (tertiary adapter).
    pub stock_api_base_url: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            finnhub_api_key: env_opt("FINNHUB_API_KEY"),
            stock_api_key: env_opt("STOCK_API_KEY"),
            stock_api_base_url: env_opt("STOCK_API_BASE_URL"),
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
