use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, TraceLevel, WatchlistAction};
use dalal_warehouse::portfolio::Portfolio;
use dalal_warehouse::schema::crypto::{CoinGecko, CoinGeckoBitcoin, CoinGeckoMovers};
use dalal_warehouse::schema::news::{NewsFeed, Rss2Json};
use dalal_warehouse::schema::stock::{Nse, NseIndices, NseMovers, NsePastIpos, NseQuote, NseUpcomingIpos};
use dalal_warehouse::watchlist::{JsonFileRepository, WatchItem, Watchlist};
use dalal_warehouse::{refresh, Api, Config};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, subscriber, trace, warn, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod ui;

fn preprocess(trace_level: Level) -> Result<()> {
    dotenv::dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::TRACE => Level::TRACE,
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");

    let config = Config::from_env()?;
    debug!("{config:?}");
    let http_client = reqwest::ClientBuilder::new()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(10))
        .build()?;

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> dalal <COMMAND>"
    match cli.command {
        // "> dalal movers [--segment small|medium|large]"
        Commands::Movers { segment } => {
            let movers = NseMovers(Nse::from_config(&config))
                .serve(&http_client, &segment)
                .await;
            ui::emit(&movers, cli.json, |m| {
                ui::movers_table(&format!("NSE {segment}-cap movers"), m)
            })?;
        }

        // "> dalal crypto"
        Commands::Crypto => {
            let movers = CoinGeckoMovers(CoinGecko::from_config(&config))
                .serve(&http_client, &())
                .await;
            ui::emit(&movers, cli.json, |m| ui::movers_table("Crypto movers (24h)", m))?;
        }

        // "> dalal indices"
        Commands::Indices => {
            let indices = NseIndices(Nse::from_config(&config))
                .serve(&http_client, &())
                .await;
            ui::emit(&indices, cli.json, ui::indices_table)?;
        }

        // "> dalal bitcoin"
        Commands::Bitcoin => {
            let quote = CoinGeckoBitcoin(CoinGecko::from_config(&config))
                .serve(&http_client, &())
                .await;
            ui::emit(&quote, cli.json, ui::bitcoin_card)?;
        }

        // "> dalal quote SYMBOL"
        Commands::Quote { symbol } => {
            let quote = NseQuote(Nse::from_config(&config))
                .serve(&http_client, &symbol)
                .await;
            ui::emit(&quote, cli.json, |q| ui::quote_card(&q.stock))?;
        }

        // "> dalal ipos [--past]"
        Commands::Ipos { past } => {
            let nse = Nse::from_config(&config);
            match past {
                true => {
                    let past = NsePastIpos(nse).serve(&http_client, &()).await;
                    ui::emit(&past, cli.json, |p| ui::ipo_table(&p.past_issues))?;
                }
                false => {
                    let upcoming = NseUpcomingIpos(nse).serve(&http_client, &()).await;
                    ui::emit(&upcoming, cli.json, |u| ui::ipo_table(&u.ipos))?;
                }
            }
        }

        // "> dalal news"
        Commands::News => {
            let news = NewsFeed(Rss2Json::from_config(&config))
                .serve(&http_client, &())
                .await;
            ui::emit(&news, cli.json, ui::news_list)?;
        }

        // ---------------------------------------------------------------------------
        // "> dalal watch [--segment S] [--every SECS]"
        // re-fetch until Ctrl-C
        Commands::Watch { segment, every } => {
            let period = every.map(Duration::from_secs).unwrap_or(config.refresh);
            info!("Refreshing NSE {segment}-cap movers every {period:?}; Ctrl-C to stop");

            let provider = NseMovers(Nse::from_config(&config));
            let json = cli.json;
            let cancel = CancellationToken::new();
            let job = {
                let http_client = http_client.clone();
                move || {
                    let (provider, http_client) = (provider.clone(), http_client.clone());
                    async move {
                        let movers = provider.serve(&http_client, &segment).await;
                        if let Err(e) = ui::emit(&movers, json, |m| {
                            ui::movers_table(&format!("NSE {segment}-cap movers"), m)
                        }) {
                            error!("Failed printing movers: {e}");
                        }
                    }
                }
            };
            let handle = refresh::spawn(period, cancel.clone(), job);

            tokio::signal::ctrl_c().await?;
            info!("Stopping");
            cancel.cancel();
            handle.await?;
        }

        ////////////////////////////////////////////////////////////////////////////////////////////////////

        // "> dalal watchlist [list add remove import export clear]"
        Commands::Watchlist { action } => {
            let watchlist = Watchlist::new(Arc::new(JsonFileRepository::new(&config.watchlist_path)));
            debug!("Watchlist at {}", config.watchlist_path.display());

            match action {
                WatchlistAction::List => {
                    let items = watchlist.items().await;
                    ui::emit(&items, cli.json, |items| ui::watchlist_table(items))?;
                }
                WatchlistAction::Add { symbol, name } => {
                    let item = WatchItem::new(&symbol, name.as_deref().unwrap_or_default());
                    match watchlist.add(item).await? {
                        true => info!("Added {symbol}"),
                        false => warn!("{symbol} is already watched"),
                    }
                }
                WatchlistAction::Remove { symbol } => {
                    match watchlist.remove(&symbol).await? {
                        true => info!("Removed {symbol}"),
                        false => warn!("{symbol} is not watched"),
                    }
                }
                WatchlistAction::Import { path } => {
                    let count = watchlist.import(&path).await?;
                    info!("Imported {count} item(s) from {}", path.display());
                }
                WatchlistAction::Export { path } => {
                    let count = watchlist.export(&path).await?;
                    info!("Exported {count} item(s) to {}", path.display());
                }
                WatchlistAction::Clear => {
                    watchlist.clear().await?;
                    info!("Watchlist cleared");
                }
            }
        }

        // "> dalal portfolio"
        Commands::Portfolio => {
            let summary = Portfolio::sample().summary();
            ui::emit(&summary, cli.json, ui::portfolio_table)?;
        }
    }

    Ok(())
}
