use super::{MarketCapSegment, Nse};
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use crate::schema::common::{rank, Direction, Mover, Movers, MOVERS_LIMIT};
use crate::schema::common_de::{first_number, first_text, Candidate};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::collections::BTreeMap as Map;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Top gainers & losers from the NSE, per market-cap segment
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Only the head of each upstream array is considered.
pub const RAW_SCAN_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct NseMovers(pub Nse);

impl NseMovers {
    fn variations_url(&self, direction: Direction) -> String {
        self.0
            .url(&format!("api/live-analysis-variations?index={direction}"))
    }
}

#[async_trait]
impl Http for NseMovers {
    type Query = MarketCapSegment;
    type Output = Movers;

    async fn fetch(&self, http_client: &HttpClient, segment: &MarketCapSegment) -> Result<Movers, FetchError> {
        let session = self.0.session(http_client).await?;

        let gainers_url = self.variations_url(Direction::Gain);
        let losers_url = self.variations_url(Direction::Loss);
        let (gainers, losers) = futures::try_join!(
            fetch_de::<Value>(http_client, &gainers_url, session.headers().clone()),
            fetch_de::<Value>(http_client, &losers_url, session.headers().clone()),
        )?;

        let movers = Movers {
            gainers: normalize(&gainers, *segment, Direction::Gain),
            losers: normalize(&losers, *segment, Direction::Loss),
        };
        debug!(
            "NSE {segment} movers: {} gainers, {} losers",
            movers.gainers.len(),
            movers.losers.len()
        );

        // live & static data are never mixed within one response
        match movers.is_complete() {
            true => Ok(movers),
            false => Err(FetchError::Empty(format!("NSE {segment} movers"))),
        }
    }
}

impl Api for NseMovers {
    fn fallback(&self, segment: &MarketCapSegment) -> Movers {
        fallback(*segment)
    }
}

/// Unwrap, reconcile, rank & truncate one upstream payload.
pub fn normalize(payload: &Value, segment: MarketCapSegment, direction: Direction) -> Vec<Mover> {
    let records = unwrap_records(payload, segment, direction);
    let movers = records.iter().take(RAW_SCAN_LIMIT).map(reconcile);
    rank(movers, direction, MOVERS_LIMIT)
}

// -------------------------------------------------------------------------------------------------
// Response unwrapping

/// Key under which the NSE nests each segment's records, e.g.,
///
/// ```json
/// { "NIFTY": { "data": [...] }, "NIFTYNEXT50": { "data": [...] }, "allSec": { "data": [...] } }
/// ```
pub fn segment_key(segment: MarketCapSegment) -> &'static str {
    match segment {
        MarketCapSegment::Large => "NIFTY",
        MarketCapSegment::Medium => "NIFTYNEXT50",
        MarketCapSegment::Small => "allSec",
    }
}

/// Locate the records inside a payload whose shape varies by endpoint version. First match
/// wins:
///
/// 1. the payload itself is an array;
/// 2. a `data` array;
/// 3. the segment key, holding an array or `{ "data": [...] }`;
/// 4. the `FO` key, likewise;
/// 5. the direction key (`gainers` / `losers`).
///
/// No match is not an error: the result is simply empty.
pub fn unwrap_records(payload: &Value, segment: MarketCapSegment, direction: Direction) -> &[Value] {
    fn array_at<'a>(value: Option<&'a Value>) -> Option<&'a [Value]> {
        value.and_then(Value::as_array).map(Vec::as_slice)
    }

    fn nested<'a>(value: Option<&'a Value>) -> Option<&'a [Value]> {
        array_at(value).or_else(|| array_at(value.and_then(|v| v.get("data"))))
    }

    let records = array_at(Some(payload))
        .or_else(|| array_at(payload.get("data")))
        .or_else(|| nested(payload.get(segment_key(segment))))
        .or_else(|| nested(payload.get("FO")))
        .or_else(|| array_at(payload.get(direction.to_string())));

    if records.is_none() {
        debug!("no known record array in {direction} payload");
    }
    records.unwrap_or_default()
}

// -------------------------------------------------------------------------------------------------
// Field reconciliation

const SYMBOL: &[Candidate] = &[&["symbol"], &["mSymbol"], &["tradingsymbol"]];
const NAME: &[Candidate] = &[
    &["meta", "companyName"],
    &["companyName"],
    &["securityName"],
    &["name"],
];
const PRICE: &[Candidate] = &[&["lastPrice"], &["ltp"], &["closePrice"], &["price"]];
const PREVIOUS_CLOSE: &[Candidate] = &[&["previousClose"], &["prevClose"], &["prev_close"]];
const CHANGE: &[Candidate] = &[
    &["netPrice"],
    &["net_price"],
    &["change"],
    &["changePrice"],
    &["change_price"],
    &["priceChange"],
];
const CHANGE_PERCENT: &[Candidate] = &[
    &["pChange"],
    &["perChange"],
    &["priceChangePercent"],
    &["changePercent"],
    &["pctChange"],
];

/// Map one raw record to a [`Mover`], tolerating absent & renamed fields. Never fails;
/// anything missing degrades to zero (or an empty string).
pub fn reconcile(record: &Value) -> Mover {
    let symbol = first_text(record, SYMBOL).unwrap_or_default();
    let name = first_text(record, NAME).unwrap_or_else(|| symbol.clone());
    let price = first_number(record, PRICE).unwrap_or(0.0);
    let previous_close = first_number(record, PREVIOUS_CLOSE).unwrap_or(0.0);

    let mut change = first_number(record, CHANGE).unwrap_or_else(|| {
        match price != 0.0 && previous_close != 0.0 {
            true => price - previous_close,
            false => 0.0,
        }
    });
    let mut change_percent = first_number(record, CHANGE_PERCENT).unwrap_or(0.0);

    // upstream endpoints populate one or the other; derive the missing one
    if previous_close > 0.0 {
        if change_percent == 0.0 && change != 0.0 {
            change_percent = change / previous_close * 100.0;
        }
        if change == 0.0 && change_percent != 0.0 {
            change = change_percent / 100.0 * previous_close;
        }
    }

    Mover {
        symbol,
        name,
        price,
        change,
        change_percent,
        image: None,
    }
}

// -------------------------------------------------------------------------------------------------
// Fallback tables

lazy_static! {
    /// Statically defined movers, served verbatim when the live pipeline fails.
    ///
    /// This is currently maintained manually.
    pub static ref FALLBACK: Map<MarketCapSegment, Movers> = Map::from([
        (
            MarketCapSegment::Small,
            Movers {
                gainers: vec![
                    Mover::new("SHANTHALA", "Shanthala FMCG Products Ltd.", 31.80, 6.36, 20.00),
                    Mover::new("SUGALDAM", "Sugal & Damani Share Brokers", 91.20, 18.24, 20.00),
                    Mover::new("PASUPTAC", "Pasupati Acrylon Limited", 51.42, 10.28, 20.00),
                    Mover::new("MEGASTAR", "Megastar Foods Ltd.", 260.59, 52.12, 20.00),
                    Mover::new("JGTL", "Jasch Gauging Technologies", 666.75, 133.20, 19.99),
                ],
                losers: vec![
                    Mover::new("ROCKINGDCE", "Rockingdeals Circular Economy", 204.90, -42.31, -20.66),
                    Mover::new("SIDDHA", "Siddha Ventures Limited", 5.31, -0.89, -16.77),
                    Mover::new("COMCL", "Comfort Commotrade Ltd.", 25.28, -3.72, -14.71),
                    Mover::new("SBLI", "SBL Infratech Limited", 43.08, -5.59, -12.99),
                    Mover::new("RADIOWALLA", "Radiowalla Network Limited", 63.00, -7.88, -12.50),
                ],
            },
        ),
        (
            MarketCapSegment::Medium,
            Movers {
                gainers: vec![
                    Mover::new("CANBK", "Canara Bank", 485.50, 22.15, 4.78),
                    Mover::new("BANKBARODA", "Bank of Baroda", 245.80, 10.25, 4.35),
                    Mover::new("PNB", "Punjab National Bank", 118.45, 4.85, 4.27),
                    Mover::new("UNIONBANK", "Union Bank of India", 142.30, 5.65, 4.14),
                    Mover::new("IOB", "Indian Overseas Bank", 58.75, 2.25, 3.98),
                ],
                losers: vec![
                    Mover::new("RAMCOCEM", "Ramco Cements", 845.20, -35.80, -4.06),
                    Mover::new("SHREECEM", "Shree Cement", 28456.50, -1125.30, -3.80),
                    Mover::new("DABUR", "Dabur India", 542.80, -19.45, -3.46),
                    Mover::new("MARICO", "Marico Limited", 582.40, -19.85, -3.29),
                    Mover::new("GODREJCP", "Godrej Consumer", 1125.60, -35.20, -3.03),
                ],
            },
        ),
        (
            MarketCapSegment::Large,
            Movers {
                gainers: vec![
                    Mover::new("ADANIPORTS", "Adani Ports", 1454.1, 36.2, 2.55),
                    Mover::new("RELIANCE", "Reliance Industries", 2456.8, 58.5, 2.44),
                    Mover::new("TCS", "Tata Consultancy Services", 3421.5, 72.3, 2.16),
                    Mover::new("HDFCBANK", "HDFC Bank", 1645.2, 32.1, 1.99),
                    Mover::new("ICICIBANK", "ICICI Bank", 978.4, 18.6, 1.94),
                ],
                losers: vec![
                    Mover::new("INDUSINDBK", "IndusInd Bank", 1425.6, -38.2, -2.61),
                    Mover::new("BAJFINANCE", "Bajaj Finance", 6834.5, -175.3, -2.50),
                    Mover::new("MARUTI", "Maruti Suzuki", 10123.4, -245.6, -2.37),
                    Mover::new("KOTAKBANK", "Kotak Mahindra Bank", 1689.7, -38.9, -2.25),
                    Mover::new("ASIANPAINT", "Asian Paints", 2895.2, -62.1, -2.10),
                ],
            },
        ),
    ]);
}

/// The literal pair for `segment`.
pub fn fallback(segment: MarketCapSegment) -> Movers {
    FALLBACK.get(&segment).cloned().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derives_change_from_previous_close() {
        let mover = reconcile(&json!({"symbol": "AAA", "lastPrice": 100, "previousClose": 90}));
        assert_eq!(mover.name, "AAA");
        assert_eq!(mover.price, 100.0);
        assert!(close(mover.change, 10.0));
        assert!(close(mover.change_percent, 100.0 / 9.0));
    }

    #[test]
    fn repairs_percent_from_change() {
        let mover = reconcile(&json!({"symbol": "X", "change": 10, "changePercent": 0, "previousClose": 100}));
        assert!(close(mover.change_percent, 10.0));
    }

    #[test]
    fn repairs_change_from_percent() {
        let mover = reconcile(&json!({"symbol": "X", "change": 0, "changePercent": -5, "previousClose": 200}));
        assert!(close(mover.change, -10.0));
    }

    #[test]
    fn no_repair_without_previous_close() {
        let mover = reconcile(&json!({"symbol": "X", "price": 12, "change": 3}));
        assert_eq!(mover.change, 3.0);
        assert_eq!(mover.change_percent, 0.0);
    }

    #[test]
    fn reads_nse_field_names() {
        let mover = reconcile(&json!({
            "tradingsymbol": "PNB",
            "meta": {"companyName": "Punjab National Bank"},
            "ltp": "118.45",
            "prev_close": "113.60",
            "net_price": "4.85",
            "perChange": "4.27"
        }));
        assert_eq!(mover.symbol, "PNB");
        assert_eq!(mover.name, "Punjab National Bank");
        assert_eq!(mover.price, 118.45);
        assert_eq!(mover.change, 4.85);
        assert_eq!(mover.change_percent, 4.27);
    }

    #[test]
    fn garbage_degrades_to_zero() {
        let mover = reconcile(&json!({"lastPrice": "—", "pChange": {"nested": true}}));
        assert_eq!(mover, Mover::default());
        assert_eq!(reconcile(&json!("not an object")), Mover::default());
    }

    #[test]
    fn gainer_scenario() {
        let payload = json!([
            {"symbol": "AAA", "lastPrice": 100, "previousClose": 90},
            {"symbol": "BBB", "lastPrice": 50, "previousClose": 55},
            {"symbol": "", "lastPrice": 10, "previousClose": 9}
        ]);
        let gainers = normalize(&payload, MarketCapSegment::Large, Direction::Gain);

        assert_eq!(gainers.len(), 1);
        assert_eq!(gainers[0].symbol, "AAA");
        assert_eq!(gainers[0].price, 100.0);
        assert!(close(gainers[0].change, 10.0));
        assert!((gainers[0].change_percent - 11.11).abs() < 0.01);
    }

    #[test]
    fn wrapper_shapes_normalize_alike() {
        let rows = json!([
            {"symbol": "CANBK", "lastPrice": 485.5, "pChange": 4.78},
            {"symbol": "PNB", "lastPrice": 118.45, "pChange": 4.27}
        ]);
        let expected = normalize(&rows, MarketCapSegment::Medium, Direction::Gain);
        assert_eq!(expected.len(), 2);

        for payload in [
            json!({"gainers": rows}),
            json!({"data": rows}),
            json!({"FO": rows}),
            json!({"NIFTYNEXT50": {"data": rows}}),
            json!({"NIFTYNEXT50": rows}),
        ] {
            assert_eq!(normalize(&payload, MarketCapSegment::Medium, Direction::Gain), expected);
        }
    }

    #[test]
    fn unwrap_priority() {
        let payload = json!({"gainers": [{"symbol": "G"}], "data": [{"symbol": "D"}]});
        let records = unwrap_records(&payload, MarketCapSegment::Large, Direction::Gain);
        assert_eq!(records, [json!({"symbol": "D"})]);

        let payload = json!({"NIFTY": {"data": [{"symbol": "N"}]}, "FO": [{"symbol": "F"}]});
        let records = unwrap_records(&payload, MarketCapSegment::Large, Direction::Gain);
        assert_eq!(records, [json!({"symbol": "N"})]);
    }

    #[test]
    fn unknown_shape_is_empty() {
        for payload in [json!({"legends": []}), json!("down for maintenance"), json!({"data": {}})] {
            assert!(unwrap_records(&payload, MarketCapSegment::Small, Direction::Loss).is_empty());
        }
    }

    #[test]
    fn only_the_head_is_scanned() {
        let mut rows: Vec<Value> = (0..RAW_SCAN_LIMIT)
            .map(|i| json!({"symbol": format!("S{i}"), "lastPrice": 10, "pChange": 1}))
            .collect();
        rows.push(json!({"symbol": "LATE", "lastPrice": 10, "pChange": 99}));

        let gainers = normalize(&Value::Array(rows), MarketCapSegment::Large, Direction::Gain);
        assert!(gainers.iter().all(|m| m.symbol != "LATE"));
    }

    #[test]
    fn fallback_tables_are_well_formed() {
        for segment in MarketCapSegment::ALL {
            let movers = fallback(segment);
            assert!(movers.is_complete());
            assert!(movers.gainers.iter().all(|m| m.change_percent > 0.0));
            assert!(movers.losers.iter().all(|m| m.change_percent < 0.0));
        }
        assert_eq!(fallback(MarketCapSegment::Large).gainers[0].symbol, "ADANIPORTS");
    }

    proptest! {
        #[test]
        fn reconciling_a_normalized_record_is_idempotent(
            symbol in "[A-Z]{1,8}",
            paise in 1u32..10_000_000,
            change in -50_000i32..50_000,
            change_percent in -2_000i32..2_000,
        ) {
            let mover = Mover::new(
                &symbol,
                &symbol,
                paise as f64 / 100.0,
                change as f64 / 100.0,
                change_percent as f64 / 100.0,
            );
            let raw = serde_json::to_value(&mover).unwrap();
            prop_assert_eq!(reconcile(&raw), mover);
        }
    }
}
