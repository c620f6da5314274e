use super::Nse;
use crate::api::{fetch_de, Api, Http};
use crate::error::FetchError;
use crate::schema::common_de::{first_label, Candidate};
use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

////////////////////////////////////////////////////////////////////////////////////////////////////////////
//
// NSE public issues: current & past
//
////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// At most this many issues are shown per list.
pub const IPO_LIMIT: usize = 6;

/// Every field is display text; anything the exchange omits reads `N/A`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ipo {
    pub company_name: String,
    pub symbol: String,
    pub issue_size: String,
    pub price_band: String,
    pub open_date: String,
    pub close_date: String,
    pub lot_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_date: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct UpcomingIpos {
    pub ipos: Vec<Ipo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PastIpos {
    pub past_issues: Vec<Ipo>,
}

const NOT_AVAILABLE: &str = "N/A";

const COMPANY_NAME: &[Candidate] = &[&["companyName"], &["company_name"], &["name"]];
const SYMBOL: &[Candidate] = &[&["symbol"], &["companySymbol"]];
const ISSUE_SIZE: &[Candidate] = &[&["issueSize"], &["issue_size"], &["size"]];
const PRICE_BAND: &[Candidate] = &[&["priceBand"], &["price_band"], &["priceRange"]];
const OPEN_DATE: &[Candidate] = &[&["openDate"], &["open_date"], &["biddingStartDate"]];
const CLOSE_DATE: &[Candidate] = &[&["closeDate"], &["close_date"], &["biddingEndDate"]];
const LOT_SIZE: &[Candidate] = &[&["lotSize"], &["lot_size"]];
const LISTING_DATE: &[Candidate] = &[&["listingDate"], &["listing_date"]];

/// The issues in `payload` (a bare array, or one under `data`), first [`IPO_LIMIT`] kept.
pub fn parse_issues(payload: &Value, listed: bool) -> Vec<Ipo> {
    let records = match payload {
        Value::Array(records) => records.as_slice(),
        _ => payload
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
    };

    records
        .iter()
        .take(IPO_LIMIT)
        .map(|record| {
            let label = |candidates: &[Candidate]| {
                first_label(record, candidates).unwrap_or_else(|| NOT_AVAILABLE.to_string())
            };
            Ipo {
                company_name: label(COMPANY_NAME),
                symbol: label(SYMBOL),
                issue_size: label(ISSUE_SIZE),
                price_band: label(PRICE_BAND),
                open_date: label(OPEN_DATE),
                close_date: label(CLOSE_DATE),
                lot_size: label(LOT_SIZE),
                listing_date: listed.then(|| label(LISTING_DATE)),
            }
        })
        .collect()
}

async fn issues(nse: &Nse, http_client: &HttpClient, path: &str, listed: bool) -> Result<Vec<Ipo>, FetchError> {
    let session = nse.session(http_client).await?;
    let url = nse.url(path);
    let payload: Value = fetch_de(http_client, &url, session.headers().clone()).await?;

    let issues = parse_issues(&payload, listed);
    debug!("{} issue(s) from {url}", issues.len());
    Ok(issues)
}

// -------------------------------------------------------------------------------------------------

/// Issues currently open for bidding.
#[derive(Debug, Clone)]
pub struct NseUpcomingIpos(pub Nse);

#[async_trait]
impl Http for NseUpcomingIpos {
    type Query = ();
    type Output = UpcomingIpos;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<UpcomingIpos, FetchError> {
        let ipos = issues(&self.0, http_client, "api/ipo-current-issue", false).await?;
        Ok(UpcomingIpos { ipos })
    }
}

impl Api for NseUpcomingIpos {
    fn fallback(&self, _: &()) -> UpcomingIpos {
        UPCOMING_FALLBACK.clone()
    }
}

/// Recently closed issues, with their listing dates.
#[derive(Debug, Clone)]
pub struct NsePastIpos(pub Nse);

#[async_trait]
impl Http for NsePastIpos {
    type Query = ();
    type Output = PastIpos;

    async fn fetch(&self, http_client: &HttpClient, _: &()) -> Result<PastIpos, FetchError> {
        let past_issues = issues(&self.0, http_client, "api/public-past-issues", true).await?;
        Ok(PastIpos { past_issues })
    }
}

impl Api for NsePastIpos {
    fn fallback(&self, _: &()) -> PastIpos {
        PAST_FALLBACK.clone()
    }
}

// -------------------------------------------------------------------------------------------------
// Fallback

fn ipo(row: (&str, &str, &str, &str, &str, &str, &str), listing_date: Option<&str>) -> Ipo {
    let (company_name, symbol, issue_size, price_band, open_date, close_date, lot_size) = row;
    Ipo {
        company_name: company_name.to_string(),
        symbol: symbol.to_string(),
        issue_size: issue_size.to_string(),
        price_band: price_band.to_string(),
        open_date: open_date.to_string(),
        close_date: close_date.to_string(),
        lot_size: lot_size.to_string(),
        listing_date: listing_date.map(str::to_string),
    }
}

lazy_static! {
    static ref ISSUES: Vec<(&'static str, &'static str, &'static str, &'static str, &'static str, &'static str, &'static str)> = vec![
        ("TechCorp Solutions Ltd.", "TCSL", "₹450 Cr", "₹320 - ₹335", "2024-01-15", "2024-01-17", "44"),
        ("Green Energy Industries", "GEIL", "₹680 Cr", "₹480 - ₹500", "2024-01-20", "2024-01-22", "30"),
        ("Digital Finance Hub", "DFHL", "₹350 Cr", "₹125 - ₹130", "2024-01-25", "2024-01-27", "115"),
        ("Healthcare Innovations", "HINL", "₹520 Cr", "₹180 - ₹185", "2024-02-01", "2024-02-03", "81"),
    ];

    pub static ref UPCOMING_FALLBACK: UpcomingIpos = UpcomingIpos {
        ipos: ISSUES.iter().map(|row| ipo(*row, None)).collect(),
    };

    pub static ref PAST_FALLBACK: PastIpos = PastIpos {
        past_issues: ISSUES
            .iter()
            .zip(["2024-01-25", "2024-01-30", "2024-02-05"])
            .map(|(row, listed)| ipo(*row, Some(listed)))
            .collect(),
    };
}
