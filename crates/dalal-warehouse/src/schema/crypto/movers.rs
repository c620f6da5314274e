use super::CoinGecko;
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use crate::schema::common::{rank, Direction, Mover, Movers, MOVERS_LIMIT};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// 24h crypto gainers & losers, out of the top 250 coins by market cap
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

const MARKETS: &str = "api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=250&sparkline=false&price_change_percentage=24h";

#[derive(Debug, Clone)]
pub struct CoinGeckoMovers(pub CoinGecko);

#[async_trait]
impl Http for CoinGeckoMovers {
    type Query = ();
    type Output = Movers;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<Movers, FetchError> {
        let coins: Vec<Coin> = fetch_de(http_client, &self.0.url(MARKETS), CoinGecko::headers()).await?;
        debug!("CoinGecko markets: {} coins", coins.len());
        Ok(rank_coins(coins))
    }
}

impl Api for CoinGeckoMovers {
    fn fallback(&self, _: &()) -> Movers {
        FALLBACK.clone()
    }
}

// -------------------------------------------------------------------------------------------------
// Deserialization

// [
//   {
//     "id": "bitcoin",
//     "symbol": "btc",
//     "name": "Bitcoin",
//     "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
//     "current_price": 43250.5,
//     "price_change_24h": 1050.25,
//     "price_change_percentage_24h": 2.48,
//     ...
//   },
//   ...
// ]
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Coin {
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_24h: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl Coin {
    /// Coins without a 24h percentage or a positive price are left out.
    fn into_mover(self) -> Option<Mover> {
        let change_percent = self.price_change_percentage_24h?;
        let price = self.current_price.filter(|price| *price > 0.0)?;
        Some(Mover {
            symbol: self.symbol.to_uppercase(),
            name: self.name,
            price,
            change: self.price_change_24h.unwrap_or(0.0),
            change_percent,
            image: self.image,
        })
    }
}

/// Convert & rank; an empty side is returned as is.
pub fn rank_coins(coins: Vec<Coin>) -> Movers {
    let movers: Vec<Mover> = coins.into_iter().filter_map(Coin::into_mover).collect();
    Movers {
        gainers: rank(movers.clone(), Direction::Gain, MOVERS_LIMIT),
        losers: rank(movers, Direction::Loss, MOVERS_LIMIT),
    }
}

lazy_static! {
    /// Served verbatim when CoinGecko is unavailable.
    pub static ref FALLBACK: Movers = Movers {
        gainers: vec![
            Mover::new("BTC", "Bitcoin", 43250.50, 1050.25, 2.48),
            Mover::new("ETH", "Ethereum", 2650.75, 85.50, 3.33),
            Mover::new("BNB", "Binance Coin", 315.20, 8.45, 2.75),
            Mover::new("SOL", "Solana", 98.45, 4.20, 4.46),
            Mover::new("ADA", "Cardano", 0.52, 0.02, 4.00),
        ],
        losers: vec![
            Mover::new("DOGE", "Dogecoin", 0.083, -0.004, -4.60),
            Mover::new("TRX", "TRON", 0.105, -0.005, -4.54),
            Mover::new("DOT", "Polkadot", 7.15, -0.35, -4.66),
            Mover::new("MATIC", "Polygon", 0.82, -0.04, -4.65),
            Mover::new("LINK", "Chainlink", 14.25, -0.75, -5.00),
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn coins(value: serde_json::Value) -> Vec<Coin> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn ranks_24h_moves() {
        let movers = rank_coins(coins(json!([
            {"symbol": "btc", "name": "Bitcoin", "current_price": 43000.0, "price_change_24h": 900.0, "price_change_percentage_24h": 2.1},
            {"symbol": "pepe", "name": "Pepe", "current_price": 0.00001, "price_change_24h": null, "price_change_percentage_24h": 12.5, "image": "https://img/pepe.png"},
            {"symbol": "doge", "name": "Dogecoin", "current_price": 0.08, "price_change_24h": -0.004, "price_change_percentage_24h": -4.6}
        ])));

        let gainers: Vec<&str> = movers.gainers.iter().map(|m| m.symbol.as_str()).collect();
        assert_eq!(gainers, ["PEPE", "BTC"]);
        assert_eq!(movers.gainers[0].change, 0.0);
        assert_eq!(movers.gainers[0].image.as_deref(), Some("https://img/pepe.png"));
        assert_eq!(movers.losers.len(), 1);
        assert_eq!(movers.losers[0].symbol, "DOGE");
    }

    #[test]
    fn coins_missing_data_are_skipped() {
        let movers = rank_coins(coins(json!([
            {"symbol": "new", "name": "Fresh Listing", "current_price": 1.0, "price_change_percentage_24h": null},
            {"symbol": "dead", "name": "Delisted", "current_price": 0.0, "price_change_percentage_24h": -99.0},
            {"symbol": "ghost", "name": "No Price"}
        ])));
        assert_eq!(movers, Movers::default());
    }

    #[test]
    fn fallback_is_served_verbatim() {
        // not re-sorted; the table is literal
        assert_eq!(FALLBACK.gainers[0].symbol, "BTC");
        assert_eq!(FALLBACK.losers[4].symbol, "LINK");
    }
}
