use colored::{ColoredString, Colorize};
use dalal_warehouse::portfolio::Summary;
use dalal_warehouse::schema::crypto::Bitcoin;
use dalal_warehouse::schema::news::News;
use dalal_warehouse::schema::stock::{Indices, Ipo, Quote};
use dalal_warehouse::schema::{Mover, Movers};
use dalal_warehouse::watchlist::WatchItem;
use serde::Serialize;

/// Print `value` as pretty JSON, or through `table`.
pub fn emit<T: Serialize>(value: &T, json: bool, table: impl FnOnce(&T)) -> anyhow::Result<()> {
    match json {
        true => println!("{}", serde_json::to_string_pretty(value)?),
        false => table(value),
    }
    Ok(())
}

pub fn percent(change_percent: f64) -> String {
    format!("{change_percent:+.2}%")
}

/// Green for gains (and flat), red for losses.
fn signed(value: f64, text: String) -> ColoredString {
    match value < 0.0 {
        true => text.red(),
        false => text.green(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    match text.chars().count() > width {
        true => format!("{}…", text.chars().take(width - 1).collect::<String>()),
        false => text.to_string(),
    }
}

fn mover_rows(movers: &[Mover]) {
    if movers.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for mover in movers {
        println!(
            "  {:<12} {:<28} {:>12.2} {:>10} {:>9}",
            mover.symbol.bold(),
            truncate(&mover.name, 28),
            mover.price,
            signed(mover.change, format!("{:+.2}", mover.change)),
            signed(mover.change_percent, percent(mover.change_percent)),
        );
    }
}

pub fn movers_table(title: &str, movers: &Movers) {
    println!("{}", title.bold().underline());
    println!("{}", "Gainers".green().bold());
    mover_rows(&movers.gainers);
    println!("{}", "Losers".red().bold());
    mover_rows(&movers.losers);
    println!();
}

pub fn indices_table(indices: &Indices) {
    for index in &indices.indices {
        println!(
            "{:<14} {:>12.2} {:>10} {:>9}",
            index.name.bold(),
            index.price,
            signed(index.change, format!("{:+.2}", index.change)),
            signed(index.change_percent, percent(index.change_percent)),
        );
    }
}

pub fn bitcoin_card(quote: &Bitcoin) {
    let btc = &quote.bitcoin;
    println!("{} ({})", btc.name.bold(), btc.symbol);
    println!("  USD   {:>16.2}", btc.price_usd);
    println!("  INR   {:>16.2}", btc.price_inr);
    println!("  24h   {:>16}", signed(btc.change_24h, percent(btc.change_24h)));
    println!("  vol   {:>16.0}", btc.volume_24h);
    println!("  mcap  {:>16.0}", btc.market_cap);
}

pub fn quote_card(quote: &Quote) {
    println!("{} ({})", quote.name.bold(), quote.symbol);
    println!(
        "  last    {:>12.2} {:>10} {:>9}",
        quote.price,
        signed(quote.change, format!("{:+.2}", quote.change)),
        signed(quote.change_percent, percent(quote.change_percent)),
    );
    println!("  open    {:>12.2}   prev close {:>10.2}", quote.open, quote.previous_close);
    println!("  day     {:>12.2} - {:<10.2}", quote.day_low, quote.day_high);
    println!("  52w     {:>12.2} - {:<10.2}", quote.low52, quote.high52);
    println!("  circuit {:>12.2} - {:<10.2}", quote.lower_circuit, quote.upper_circuit);
    println!("  volume  {:>12}   value {:>15.0}", quote.volume, quote.value);
    println!("  {}", quote.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed());
}

pub fn ipo_table(ipos: &[Ipo]) {
    if ipos.is_empty() {
        println!("{}", "no issues".dimmed());
    }
    for ipo in ipos {
        println!(
            "{:<10} {:<28} {:>12} {:>16}  {} → {}  lot {}{}",
            ipo.symbol.bold(),
            truncate(&ipo.company_name, 28),
            ipo.issue_size,
            ipo.price_band,
            ipo.open_date,
            ipo.close_date,
            ipo.lot_size,
            ipo.listing_date
                .as_ref()
                .map(|listed| format!("  listed {listed}"))
                .unwrap_or_default(),
        );
    }
}

/// Tags dropped & whitespace collapsed, for feed descriptions sent as HTML.
fn plain(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn news_list(news: &News) {
    for article in &news.articles {
        println!("{}", article.title.bold());
        println!("  {} · {}", article.source, article.published_at.dimmed());
        let description = plain(&article.description);
        if !description.is_empty() {
            println!("  {}", truncate(&description, 120));
        }
        println!("  {}", article.url.underline());
    }
}

pub fn watchlist_table(items: &[WatchItem]) {
    if items.is_empty() {
        println!("{}", "watchlist is empty".dimmed());
    }
    for item in items {
        println!("{:<12} {}", item.symbol.bold(), item.name);
    }
}

pub fn portfolio_table(summary: &Summary) {
    println!(
        "{:<10} {:>5} {:>10} {:>10} {:>12} {:>11} {:>9}",
        "symbol", "qty", "buy", "last", "value", "P&L", "P&L %"
    );
    for row in &summary.holdings {
        println!(
            "{:<10} {:>5} {:>10.2} {:>10.2} {:>12.2} {:>11} {:>9}",
            row.holding.symbol.bold(),
            row.holding.quantity,
            row.holding.buy_price,
            row.holding.current_price,
            row.value,
            signed(row.pnl, format!("{:+.2}", row.pnl)),
            signed(row.pnl_percent, percent(row.pnl_percent)),
        );
    }
    println!();
    println!("invested  {:>12.2}", summary.total_invested);
    println!("value     {:>12.2}", summary.total_value);
    println!(
        "P&L       {:>12} ({})",
        signed(summary.total_pnl, format!("{:+.2}", summary.total_pnl)),
        signed(summary.total_pnl_percent, percent(summary.total_pnl_percent)),
    );
}
