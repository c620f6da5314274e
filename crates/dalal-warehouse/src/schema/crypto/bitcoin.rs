use super::CoinGecko;
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const SIMPLE_PRICE: &str = "api/v3/simple/price?ids=bitcoin&vs_currencies=usd,inr&include_24hr_change=true&include_24hr_vol=true&include_market_cap=true";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BitcoinQuote {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "priceUSD")]
    pub price_usd: f64,
    #[serde(rename = "priceINR")]
    pub price_inr: f64,
    #[serde(rename = "change24h")]
    pub change_24h: f64,
    #[serde(rename = "volume24h")]
    pub volume_24h: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bitcoin {
    pub bitcoin: BitcoinQuote,
}

// { "bitcoin": { "usd": 43250.5, "inr": 3598000, "usd_24h_change": 2.45, "usd_24h_vol": 2.85e10, "usd_market_cap": 8.5e11 } }
#[derive(Deserialize, Debug, Default)]
struct SimplePrice {
    #[serde(default)]
    bitcoin: SimplePriceRow,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct SimplePriceRow {
    usd: f64,
    inr: f64,
    usd_24h_change: f64,
    usd_24h_vol: f64,
    usd_market_cap: f64,
}

impl From<SimplePriceRow> for BitcoinQuote {
    fn from(row: SimplePriceRow) -> Self {
        Self {
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            price_usd: row.usd,
            price_inr: row.inr,
            change_24h: row.usd_24h_change,
            volume_24h: row.usd_24h_vol,
            market_cap: row.usd_market_cap,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoinGeckoBitcoin(pub CoinGecko);

#[async_trait]
impl Http for CoinGeckoBitcoin {
    type Query = ();
    type Output = Bitcoin;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<Bitcoin, FetchError> {
        let price: SimplePrice = fetch_de(http_client, &self.0.url(SIMPLE_PRICE), CoinGecko::headers()).await?;
        Ok(Bitcoin {
            bitcoin: price.bitcoin.into(),
        })
    }
}

impl Api for CoinGeckoBitcoin {
    fn fallback(&self, _: &()) -> Bitcoin {
        Bitcoin {
            bitcoin: BitcoinQuote {
                symbol: "BTC".to_string(),
                name: "Bitcoin".to_string(),
                price_usd: 43250.50,
                price_inr: 3598000.00,
                change_24h: 2.45,
                volume_24h: 28500000000.0,
                market_cap: 850000000000.0,
            },
        }
    }
}
