use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length of every ranked list handed to callers.
pub const MOVERS_LIMIT: usize = 5;

/// An instrument with a notable price change, in canonical shape, e.g.,
///
/// ```json
/// {
///     "symbol": "TCS",
///     "name": "Tata Consultancy Services",
///     "price": 3421.5,
///     "change": 72.3,
///     "changePercent": 2.16
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Mover {
    pub fn new(symbol: &str, name: &str, price: f64, change: f64, change_percent: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            price,
            change,
            change_percent,
            image: None,
        }
    }

    /// A record is only worth ranking with a ticker and a positive trade price.
    pub fn is_valid(&self) -> bool {
        !self.symbol.is_empty() && self.price > 0.0
    }
}

/// Both ranked lists of one response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Movers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

impl Movers {
    /// Live data only counts when both sides have something to show.
    pub fn is_complete(&self) -> bool {
        !self.gainers.is_empty() && !self.losers.is_empty()
    }
}

/// Direction of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Gain,
    Loss,
}

impl Direction {
    /// Sign filter; zero belongs to neither direction.
    pub fn admits(self, change_percent: f64) -> bool {
        match self {
            Direction::Gain => change_percent > 0.0,
            Direction::Loss => change_percent < 0.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Gain => write!(f, "gainers"),
            Direction::Loss => write!(f, "losers"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gain" | "gainers" | "up" => Ok(Direction::Gain),
            "loss" | "losers" | "down" => Ok(Direction::Loss),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Filter, rank & truncate:
///
/// 1. drop invalid records (empty symbol, non-positive price);
/// 2. drop records moving the other way;
/// 3. stable sort, most extreme first (descending for gains, ascending for losses);
/// 4. keep at most `limit`.
pub fn rank<I>(movers: I, direction: Direction, limit: usize) -> Vec<Mover>
where
    I: IntoIterator<Item = Mover>,
{
    let mut ranked: Vec<Mover> = movers
        .into_iter()
        .filter(|mover| mover.is_valid() && direction.admits(mover.change_percent))
        .collect();

    match direction {
        Direction::Gain => ranked.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent)),
        Direction::Loss => ranked.sort_by(|a, b| a.change_percent.total_cmp(&b.change_percent)),
    }

    ranked.truncate(limit);
    ranked
}
