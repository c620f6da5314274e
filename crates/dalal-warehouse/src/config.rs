use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_NSE_BASE_URL: &str = "https://www.nseindia.com";
pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com";
pub const DEFAULT_NEWS_BASE_URL: &str = "https://api.rss2json.com";
pub const DEFAULT_WATCHLIST_PATH: &str = "./watchlist.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_REFRESH_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, found {value:?}")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Runtime settings, read from the environment (and `.env`).
///
/// | variable             | default                      |
/// |----------------------|------------------------------|
/// | `USER_AGENT`         | desktop Chrome               |
/// | `NSE_BASE_URL`       | `https://www.nseindia.com`   |
/// | `COINGECKO_BASE_URL` | `https://api.coingecko.com`  |
/// | `NEWS_BASE_URL`      | `https://api.rss2json.com`   |
/// | `WATCHLIST_PATH`     | `./watchlist.json`           |
/// | `BIND_ADDR`          | `127.0.0.1:8080`             |
/// | `REFRESH_SECS`       | `60`                         |
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub user_agent: String,
    pub nse_base_url: String,
    pub coingecko_base_url: String,
    pub news_base_url: String,
    pub watchlist_path: PathBuf,
    pub bind_addr: String,
    pub refresh: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            nse_base_url: DEFAULT_NSE_BASE_URL.to_string(),
            coingecko_base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            news_base_url: DEFAULT_NEWS_BASE_URL.to_string(),
            watchlist_path: PathBuf::from(DEFAULT_WATCHLIST_PATH),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            refresh: Duration::from_secs(DEFAULT_REFRESH_SECS),
        }
    }
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(user_agent) = get("USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(url) = get("NSE_BASE_URL") {
            config.nse_base_url = url;
        }
        if let Some(url) = get("COINGECKO_BASE_URL") {
            config.coingecko_base_url = url;
        }
        if let Some(url) = get("NEWS_BASE_URL") {
            config.news_base_url = url;
        }
        if let Some(path) = get("WATCHLIST_PATH") {
            config.watchlist_path = PathBuf::from(path);
        }
        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = get("REFRESH_SECS") {
            config.refresh = match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "REFRESH_SECS",
                        value: secs,
                        expected: "a positive number of seconds",
                    })
                }
            };
        }

        Ok(config)
    }
}
