pub mod bitcoin;
pub mod movers;

pub use bitcoin::{Bitcoin, BitcoinQuote, CoinGeckoBitcoin};
pub use movers::CoinGeckoMovers;

use crate::config::Config;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

/// CoinGecko public API; no key, no session.
#[derive(Debug, Clone)]
pub struct CoinGecko {
    base_url: String,
}

impl CoinGecko {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.coingecko_base_url)
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query.trim_start_matches('/'))
    }

    pub fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}
