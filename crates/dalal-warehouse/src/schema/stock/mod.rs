pub mod indices;
pub mod ipo;
pub mod movers;
pub mod quote;

pub use indices::{Index, Indices, NseIndices};
pub use ipo::{Ipo, NsePastIpos, NseUpcomingIpos, PastIpos, UpcomingIpos};
pub use movers::NseMovers;
pub use quote::{NseQuote, Quote, StockQuote};

use crate::config::Config;
use crate::error::FetchError;
use dalal_util::{Session, SessionHeaders};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market-capitalization bucket, selecting both the upstream records and the fallback table.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MarketCapSegment {
    Small,
    Medium,
    #[default]
    Large,
}

impl MarketCapSegment {
    pub const ALL: [MarketCapSegment; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Lenient parse for query strings: anything unrecognised is `Large`.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for MarketCapSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketCapSegment::Small => write!(f, "small"),
            MarketCapSegment::Medium => write!(f, "medium"),
            MarketCapSegment::Large => write!(f, "large"),
        }
    }
}

impl FromStr for MarketCapSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "smallcap" => Ok(MarketCapSegment::Small),
            "medium" | "mid" | "midcap" => Ok(MarketCapSegment::Medium),
            "large" | "largecap" => Ok(MarketCapSegment::Large),
            other => Err(format!("unknown market-cap segment: {other}")),
        }
    }
}

/// National Stock Exchange of India; its JSON API is only served to clients holding the
/// cookies set by the landing page.
#[derive(Debug, Clone)]
pub struct Nse {
    base_url: String,
    user_agent: String,
}

impl Nse {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.nse_base_url, &config.user_agent)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Visit the landing page for the session cookies.
    pub async fn session(&self, http_client: &HttpClient) -> Result<SessionHeaders, FetchError> {
        let landing = format!("{}/", self.base_url);
        let session = http_client.acquire_session(&landing, &self.user_agent).await?;
        Ok(session)
    }
}
