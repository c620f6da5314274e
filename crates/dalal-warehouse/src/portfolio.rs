use serde::{Deserialize, Serialize};

/// A position held, priced at its last known quote.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: String,
    pub name: String,
    pub quantity: u32,
    pub buy_price: f64,
    pub current_price: f64,
    pub change_percent: f64,
}

impl Holding {
    pub fn value(&self) -> f64 {
        self.current_price * self.quantity as f64
    }

    pub fn invested(&self) -> f64 {
        self.buy_price * self.quantity as f64
    }

    pub fn pnl(&self) -> f64 {
        self.value() - self.invested()
    }

    pub fn pnl_percent(&self) -> f64 {
        match self.buy_price > 0.0 {
            true => (self.current_price - self.buy_price) / self.buy_price * 100.0,
            false => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn new(holdings: Vec<Holding>) -> Self {
        Self { holdings }
    }

    /// The demo book shown until real positions are wired in.
    pub fn sample() -> Self {
        let holding = |symbol: &str, name: &str, quantity: u32, buy_price: f64, current_price: f64, change_percent: f64| Holding {
            symbol: symbol.to_string(),
            name: name.to_string(),
            quantity,
            buy_price,
            current_price,
            change_percent,
        };

        Self::new(vec![
            holding("RELIANCE", "Reliance Industries Ltd.", 10, 2400.00, 2456.80, 2.45),
            holding("TCS", "Tata Consultancy Services", 5, 3350.00, 3421.50, 1.85),
            holding("HDFCBANK", "HDFC Bank Ltd.", 15, 1650.00, 1645.20, -0.75),
        ])
    }

    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(Holding::value).sum()
    }

    pub fn total_invested(&self) -> f64 {
        self.holdings.iter().map(Holding::invested).sum()
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_value() - self.total_invested()
    }

    /// Zero for an empty book.
    pub fn total_pnl_percent(&self) -> f64 {
        let invested = self.total_invested();
        match invested > 0.0 {
            true => self.total_pnl() / invested * 100.0,
            false => 0.0,
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            holdings: self
                .holdings
                .iter()
                .map(|holding| Position {
                    value: holding.value(),
                    invested: holding.invested(),
                    pnl: holding.pnl(),
                    pnl_percent: holding.pnl_percent(),
                    holding: holding.clone(),
                })
                .collect(),
            total_value: self.total_value(),
            total_invested: self.total_invested(),
            total_pnl: self.total_pnl(),
            total_pnl_percent: self.total_pnl_percent(),
        }
    }
}

/// Serializable view of a [`Portfolio`], with every derived figure filled in.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub holdings: Vec<Position>,
    pub total_value: f64,
    pub total_invested: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(flatten)]
    pub holding: Holding,
    pub value: f64,
    pub invested: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}
