use crate::api::{fetch_de, Api, Http};
use crate::config::Config;
use crate::error::FetchError;
use crate::schema::common_de::{first_text, Candidate};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Market headlines, via an RSS-to-JSON bridge
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Yahoo Finance's S&P 500 headline feed.
pub const FEED_URL: &str = "https://feeds.finance.yahoo.com/rss/2.0/headline?s=^GSPC&region=US&lang=en-US";

/// At most this many articles are shown.
pub const NEWS_LIMIT: usize = 6;

/// Stock imagery for articles that carry none, picked by position.
pub const STOCK_IMAGES: [&str; 6] = [
    "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?w=400&h=250&fit=crop",
    "https://images.unsplash.com/photo-1590283603385-17ffb3a7f29f?w=400&h=250&fit=crop",
    "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=250&fit=crop",
    "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=400&h=250&fit=crop",
    "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=400&h=250&fit=crop",
    "https://images.unsplash.com/photo-1590283603385-17ffb3a7f29f?w=400&h=250&fit=crop",
];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: usize,
    pub title: String,
    pub description: String,
    pub url: String,
    /// As published by the feed; not normalized.
    pub published_at: String,
    pub source: String,
    pub image: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct News {
    pub articles: Vec<Article>,
}

/// rss2json.com; no key needed below its free-tier rate limit.
#[derive(Debug, Clone)]
pub struct Rss2Json {
    base_url: String,
}

impl Rss2Json {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.news_base_url)
    }

    /// The bridge endpoint for `feed`, with the feed URL query-encoded.
    pub fn url(&self, feed: &str) -> Result<String, FetchError> {
        let endpoint = format!("{}/v1/api.json", self.base_url);
        reqwest::Url::parse_with_params(&endpoint, &[("rss_url", feed)])
            .map(String::from)
            .map_err(|_| FetchError::InvalidUrl { url: endpoint })
    }
}

#[derive(Debug, Clone)]
pub struct NewsFeed(pub Rss2Json);

#[async_trait]
impl Http for NewsFeed {
    type Query = ();
    type Output = News;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<News, FetchError> {
        let url = self.0.url(FEED_URL)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let payload: Value = fetch_de(http_client, &url, headers).await?;
        let articles = parse_articles(&payload);
        debug!("{} headline(s)", articles.len());
        Ok(News { articles })
    }
}

impl Api for NewsFeed {
    fn fallback(&self, _: &()) -> News {
        fallback()
    }
}

// -------------------------------------------------------------------------------------------------
// Reshaping

const TITLE: &[Candidate] = &[&["title"]];
const DESCRIPTION: &[Candidate] = &[&["description"], &["content"]];
const LINK: &[Candidate] = &[&["link"]];
const PUBLISHED: &[Candidate] = &[&["pubDate"]];
const AUTHOR: &[Candidate] = &[&["author"]];
const FEED_TITLE: &[Candidate] = &[&["feed", "title"]];
const DIRECT_IMAGE: &[Candidate] = &[&["thumbnail"], &["media", "thumbnail", "url"]];
const ENCLOSURE: &[Candidate] = &[&["enclosure", "link"]];

/// The first [`NEWS_LIMIT`] of `items`, with display defaults filled in.
pub fn parse_articles(payload: &Value) -> Vec<Article> {
    let feed_title = first_text(payload, FEED_TITLE);
    let items = payload
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    items
        .iter()
        .take(NEWS_LIMIT)
        .enumerate()
        .map(|(id, item)| Article {
            id,
            title: first_text(item, TITLE).unwrap_or_else(|| "No title".to_string()),
            description: first_text(item, DESCRIPTION).unwrap_or_default(),
            url: first_text(item, LINK).unwrap_or_else(|| "#".to_string()),
            published_at: first_text(item, PUBLISHED).unwrap_or_else(|| Utc::now().to_rfc3339()),
            source: first_text(item, AUTHOR)
                .or_else(|| feed_title.clone())
                .unwrap_or_else(|| "Yahoo Finance".to_string()),
            image: image(item, id),
        })
        .collect()
}

/// Thumbnail, else the first `<img src>` in the body, else the enclosure, else stock imagery.
fn image(item: &Value, id: usize) -> String {
    first_text(item, DIRECT_IMAGE)
        .or_else(|| {
            ["content", "description"]
                .iter()
                .filter_map(|key| item.get(key).and_then(Value::as_str))
                .find_map(img_src)
        })
        .or_else(|| first_text(item, ENCLOSURE))
        .unwrap_or_else(|| STOCK_IMAGES[id % STOCK_IMAGES.len()].to_string())
}

/// `src` of the first `<img>` tag in `html` that has one.
pub fn img_src(html: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `html`
    let lower = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(offset) = lower[from..].find("<img") {
        let start = from + offset + "<img".len();
        let end = lower[start..].find('>').map_or(lower.len(), |i| start + i);
        let tag = &lower[start..end];

        if let Some(attr) = tag.find("src=") {
            let value = &html[start + attr + "src=".len()..];
            if value.starts_with(['"', '\'']) {
                let value = &value[1..];
                let len = value.find(['"', '\'']).unwrap_or(0);
                if len > 0 {
                    return Some(value[..len].to_string());
                }
            }
        }
        from = start;
    }
    None
}

// -------------------------------------------------------------------------------------------------
// Fallback

/// Evergreen headlines, stamped an hour apart ending now.
pub fn fallback() -> News {
    let now = Utc::now();
    let rows = [
        ("Stock Market Reaches New Highs Amid Economic Optimism", "Major indices surged today as investors show confidence in economic recovery and corporate earnings outlook.", "Financial Times", "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?w=400&h=250&fit=crop"),
        ("Bitcoin Surges Past $110,000 as Institutional Adoption Grows", "Cryptocurrency markets see significant gains as major corporations announce Bitcoin integration strategies.", "CoinDesk", "https://images.unsplash.com/photo-1639762681485-074b7f938ba0?w=400&h=250&fit=crop"),
        ("Tech Stocks Lead Market Rally with Strong Q4 Earnings", "Technology sector shows robust performance with several companies exceeding analyst expectations.", "Bloomberg", "https://images.unsplash.com/photo-1451187580459-43490279c0fa?w=400&h=250&fit=crop"),
        ("IPO Market Shows Strong Momentum with Multiple Listings", "Several companies prepare for public offerings as market conditions remain favorable for new listings.", "Reuters", "https://images.unsplash.com/photo-1460925895917-afdab827c52f?w=400&h=250&fit=crop"),
        ("Federal Reserve Signals Cautious Approach to Interest Rates", "Central bank maintains policy stance while monitoring inflation trends and economic indicators.", "Wall Street Journal", "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=400&h=250&fit=crop"),
        ("Renewable Energy Stocks Gain on Climate Policy Updates", "Clean energy sector experiences boost as governments announce new environmental initiatives.", "Forbes", "https://images.unsplash.com/photo-1497435334941-8c899ee9e8e9?w=400&h=250&fit=crop"),
    ];

    let articles = rows
        .iter()
        .enumerate()
        .map(|(i, (title, description, source, image))| Article {
            id: i + 1,
            title: title.to_string(),
            description: description.to_string(),
            url: "#".to_string(),
            published_at: (now - Duration::hours(i as i64)).to_rfc3339(),
            source: source.to_string(),
            image: image.to_string(),
        })
        .collect();
    News { articles }
}
