use super::Nse;
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use crate::schema::common_de::{first_nonzero, first_text, Candidate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Single-equity quote from the NSE
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// ```json
/// {
///     "stock": {
///         "symbol": "TCS",
///         "name": "Tata Consultancy Services",
///         "price": 3421.5,
///         "change": 62.3,
///         "changePercent": 1.85,
///         "open": 3380.0,
///         "previousClose": 3359.2,
///         "dayHigh": 3445.0,
///         "dayLow": 3375.5,
///         "volume": 3456789,
///         "value": 118000000000.0,
///         "high52": 3880.0,
///         "low52": 3100.0,
///         "upperCircuit": 3900.0,
///         "lowerCircuit": 2800.0,
///         "timestamp": "2026-10-17T09:15:00Z"
///     }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub previous_close: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub value: f64,
    pub high52: f64,
    pub low52: f64,
    pub upper_circuit: f64,
    pub lower_circuit: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub stock: Quote,
}

/// Upper-case & trim, as NSE symbols are matched verbatim.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct NseQuote(pub Nse);

#[async_trait]
impl Http for NseQuote {
    type Query = String;
    type Output = StockQuote;

    async fn fetch(&self, http_client: &HttpClient, symbol: &String) -> Result<StockQuote, FetchError> {
        let symbol = normalize_symbol(symbol);
        let endpoint = self.0.url("api/quote-equity");
        let url = reqwest::Url::parse_with_params(&endpoint, &[("symbol", &symbol)])
            .map_err(|_| FetchError::InvalidUrl { url: endpoint.clone() })?;

        let session = self.0.session(http_client).await?;
        let payload: Value = fetch_de(http_client, url.as_str(), session.headers().clone()).await?;

        let stock = reconcile(&payload, &symbol);
        debug!("NSE quote {symbol}: {}", stock.price);
        match stock.price > 0.0 {
            true => Ok(StockQuote { stock }),
            false => Err(FetchError::Empty(format!("NSE quote for {symbol}"))),
        }
    }
}

impl Api for NseQuote {
    fn fallback(&self, symbol: &String) -> StockQuote {
        StockQuote {
            stock: fallback(&normalize_symbol(symbol)),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Field reconciliation

// {
//   "info": { "symbol": "TCS", "companyName": "Tata Consultancy Services Limited", ... },
//   "metadata": { "companyName": ..., ... },
//   "priceInfo": {
//     "lastPrice": 3421.5, "change": 62.3, "pChange": 1.85, "previousClose": 3359.2, "open": 3380,
//     "intraDayHighLow": { "min": 3375.5, "max": 3445 },
//     "weekHighLow": { "min": 3100, "max": 3880 },
//     ...
//   }
// }
const NAME: &[Candidate] = &[&["metadata", "companyName"], &["info", "companyName"]];
const PRICE: &[Candidate] = &[&["priceInfo", "lastPrice"], &["priceInfo", "last"]];
const CHANGE: &[Candidate] = &[&["priceInfo", "change"], &["priceInfo", "netPrice"]];
const CHANGE_PERCENT: &[Candidate] = &[&["priceInfo", "pChange"], &["priceInfo", "pctChange"]];
const OPEN: &[Candidate] = &[&["priceInfo", "open"], &["priceInfo", "lastPrice"]];
const PREVIOUS_CLOSE: &[Candidate] = &[
    &["priceInfo", "previousClose"],
    &["priceInfo", "prevClose"],
    &["priceInfo", "closePrice"],
];
const DAY_HIGH: &[Candidate] = &[
    &["priceInfo", "intraDayHighLow", "maxPrice"],
    &["priceInfo", "intraDayHighLow", "high"],
    &["priceInfo", "intraDayHighLow", "max"],
    &["priceInfo", "highPrice"],
    &["priceInfo", "dayHigh"],
    &["priceInfo", "lastPrice"],
];
const DAY_LOW: &[Candidate] = &[
    &["priceInfo", "intraDayHighLow", "minPrice"],
    &["priceInfo", "intraDayHighLow", "low"],
    &["priceInfo", "intraDayHighLow", "min"],
    &["priceInfo", "lowPrice"],
    &["priceInfo", "dayLow"],
    &["priceInfo", "lastPrice"],
];
const VOLUME: &[Candidate] = &[&["priceInfo", "totalTradedVolume"], &["priceInfo", "volume"]];
const VALUE: &[Candidate] = &[&["priceInfo", "totalTradedValue"]];
const HIGH_52: &[Candidate] = &[
    &["priceInfo", "weekHighLow", "maxPrice"],
    &["priceInfo", "weekHighLow", "high"],
    &["priceInfo", "weekHighLow", "max"],
    &["priceInfo", "yearHigh"],
];
const LOW_52: &[Candidate] = &[
    &["priceInfo", "weekHighLow", "minPrice"],
    &["priceInfo", "weekHighLow", "low"],
    &["priceInfo", "weekHighLow", "min"],
    &["priceInfo", "yearLow"],
];
const UPPER_CIRCUIT: &[Candidate] = &[&["priceInfo", "circuitBreaker", "upperLimit"]];
const LOWER_CIRCUIT: &[Candidate] = &[&["priceInfo", "circuitBreaker", "lowerLimit"]];

/// Map a `quote-equity` payload to a [`Quote`]; zeros count as unreported, so each field falls
/// through to its next candidate.
pub fn reconcile(payload: &Value, symbol: &str) -> Quote {
    let number = |candidates: &[Candidate]| first_nonzero(payload, candidates).unwrap_or(0.0);

    Quote {
        symbol: symbol.to_string(),
        name: first_text(payload, NAME).unwrap_or_else(|| symbol.to_string()),
        price: number(PRICE),
        change: number(CHANGE),
        change_percent: number(CHANGE_PERCENT),
        open: number(OPEN),
        previous_close: number(PREVIOUS_CLOSE),
        day_high: number(DAY_HIGH),
        day_low: number(DAY_LOW),
        volume: number(VOLUME).max(0.0) as u64,
        value: number(VALUE),
        high52: number(HIGH_52),
        low52: number(LOW_52),
        upper_circuit: number(UPPER_CIRCUIT),
        lower_circuit: number(LOWER_CIRCUIT),
        timestamp: Utc::now(),
    }
}

// -------------------------------------------------------------------------------------------------
// Fallback

/// (name, price, change, change %, open, previous close, day high, day low, volume, value,
/// 52w high, 52w low, upper circuit, lower circuit)
pub type Row = (&'static str, f64, f64, f64, f64, f64, f64, f64, u64, f64, f64, f64, f64, f64);

lazy_static! {
    /// Quotes served for well-known symbols when the NSE is unavailable.
    ///
    /// This is currently maintained manually.
    pub static ref FALLBACK: HashMap<&'static str, Row> = HashMap::from([
        ("RELIANCE", ("Reliance Industries Ltd.", 1504.20, 1.10, 0.07, 1490.00, 1496.00, 1508.30, 1490.10, 11884745, 170000000000.0, 1551.00, 1114.05, 1635.50, 1300.30)),
        ("TCS", ("Tata Consultancy Services", 3421.50, 62.30, 1.85, 3380.00, 3359.20, 3445.00, 3375.50, 3456789, 118000000000.0, 3880.00, 3100.00, 3900.00, 2800.00)),
        ("HDFCBANK", ("HDFC Bank Ltd.", 1645.20, -12.30, -0.75, 1660.00, 1657.50, 1665.00, 1640.00, 8765432, 144000000000.0, 1750.00, 1400.00, 1800.00, 1300.00)),
        ("ITC", ("ITC Ltd.", 421.85, 3.95, 0.95, 418.00, 417.90, 423.50, 417.20, 5423456, 228000000000.0, 450.00, 380.00, 470.00, 370.00)),
    ]);
}

/// The static quote for `symbol`; unknown symbols get a flat placeholder at 1000.
pub fn fallback(symbol: &str) -> Quote {
    let (name, price, change, change_percent, open, previous_close, day_high, day_low, volume, value, high52, low52, upper_circuit, lower_circuit) =
        FALLBACK.get(symbol).copied().unwrap_or((
            "", 1000.0, 0.0, 0.0, 1000.0, 1000.0, 1010.0, 990.0, 0, 0.0, 1200.0, 800.0, 1300.0, 700.0,
        ));

    let mut quote = Quote {
        symbol: symbol.to_string(),
        name: match name.is_empty() {
            true => format!("{symbol} Ltd."),
            false => name.to_string(),
        },
        price,
        change,
        change_percent,
        open,
        previous_close,
        day_high,
        day_low,
        volume,
        value,
        high52,
        low52,
        upper_circuit,
        lower_circuit,
        timestamp: Utc::now(),
    };
    repair_day_range(&mut quote);
    quote
}

/// The day's range must contain the last price.
fn repair_day_range(quote: &mut Quote) {
    if quote.day_high == 0.0 || quote.day_high < quote.price {
        quote.day_high = quote.price * 1.02;
    }
    if quote.day_low == 0.0 || quote.day_low > quote.price {
        quote.day_low = quote.price * 0.98;
    }
}
