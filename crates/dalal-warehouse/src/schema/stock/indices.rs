use super::Nse;
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use crate::schema::common_de::{first_number, first_text, Candidate};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Headline NSE indices
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub symbol: String,
    pub name: String,
    pub country: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Indices {
    pub indices: Vec<Index>,
}

lazy_static! {
    /// Indices worth showing, as (upstream key, display name), in display order.
    pub static ref MAJOR_INDICES: Vec<(&'static str, &'static str)> = vec![
        ("NIFTY 50", "Nifty 50"),
        ("NIFTY BANK", "Nifty Bank"),
        ("NIFTY IT", "Nifty IT"),
        ("NIFTY AUTO", "Nifty Auto"),
        ("NIFTY PHARMA", "Nifty Pharma"),
        ("NIFTY FMCG", "Nifty FMCG"),
    ];

    /// Served verbatim when the live fetch fails.
    pub static ref FALLBACK: Indices = Indices {
        indices: vec![
            index("NIFTY 50", "Nifty 50", 21750.50, 125.75, 0.58),
            index("NIFTY BANK", "Nifty Bank", 47250.25, 325.30, 0.69),
            index("NIFTY IT", "Nifty IT", 38500.75, 225.50, 0.59),
            index("NIFTY AUTO", "Nifty Auto", 18250.20, 95.25, 0.52),
            index("NIFTY PHARMA", "Nifty Pharma", 18500.80, 185.40, 1.01),
            index("NIFTY FMCG", "Nifty FMCG", 54250.50, 350.75, 0.65),
        ],
    };
}

fn index(symbol: &str, name: &str, price: f64, change: f64, change_percent: f64) -> Index {
    Index {
        symbol: symbol.to_string(),
        name: name.to_string(),
        country: "India".to_string(),
        price,
        change,
        change_percent,
    }
}

const KEY: &[Candidate] = &[&["index"], &["name"], &["indexSymbol"]];
const LAST: &[Candidate] = &[&["last"], &["lastPrice"]];
const CHANGE: &[Candidate] = &[&["variation"], &["change"], &["chng"]];
const CHANGE_PERCENT: &[Candidate] = &[&["percentChange"], &["pChange"], &["perChange"]];

#[derive(Debug, Clone)]
pub struct NseIndices(pub Nse);

#[async_trait]
impl Http for NseIndices {
    type Query = ();
    type Output = Indices;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<Indices, FetchError> {
        let session = self.0.session(http_client).await?;
        let payload: Value = fetch_de(http_client, &self.0.url("api/allIndices"), session.headers().clone()).await?;

        let indices = pick_major(&payload);
        debug!("NSE indices: {} of {} found", indices.len(), MAJOR_INDICES.len());

        match indices.is_empty() {
            true => Err(FetchError::Empty("NSE indices".to_string())),
            false => Ok(Indices { indices }),
        }
    }
}

impl Api for NseIndices {
    fn fallback(&self, _: &()) -> Indices {
        FALLBACK.clone()
    }
}

/// Match the `data` rows of an `allIndices` payload against [`MAJOR_INDICES`]; indices
/// missing upstream are skipped.
pub fn pick_major(payload: &Value) -> Vec<Index> {
    let rows = payload
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    MAJOR_INDICES
        .iter()
        .filter_map(|(key, name)| {
            let row = rows.iter().find(|row| {
                KEY.iter()
                    .any(|path| first_text(row, &[*path]).as_deref() == Some(*key))
            })?;
            Some(Index {
                symbol: first_text(row, KEY).unwrap_or_else(|| key.to_string()),
                name: name.to_string(),
                country: "India".to_string(),
                price: first_number(row, LAST).unwrap_or(0.0),
                change: first_number(row, CHANGE).unwrap_or(0.0),
                change_percent: first_number(row, CHANGE_PERCENT).unwrap_or(0.0),
            })
        })
        .collect()
}
