use clap::{Parser, Subcommand, ValueEnum};
use dalal_warehouse::schema::stock::MarketCapSegment;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, value_enum, default_value = "info", ignore_case = true, global = true)]
    pub trace: TraceLevel,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Top 5 NSE gainers & losers.
    Movers {
        /// small, medium or large
        #[arg(long, short, default_value = "large")]
        segment: MarketCapSegment,
    },

    /// Top 5 crypto gainers & losers over 24h.
    Crypto,

    /// Headline NSE indices.
    Indices,

    /// Bitcoin in USD & INR.
    Bitcoin,

    /// Full quote for one NSE equity.
    Quote {
        /// NSE symbol, e.g. TCS; case-insensitive
        symbol: String,
    },

    /// NSE public issues open for bidding.
    Ipos {
        /// Recently listed issues instead
        #[arg(long)]
        past: bool,
    },

    /// Latest market headlines.
    News,

    /// Keep printing NSE movers, refreshed on an interval, until Ctrl-C.
    Watch {
        #[arg(long, short, default_value = "large")]
        segment: MarketCapSegment,

        /// Seconds between refreshes; defaults to REFRESH_SECS
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        every: Option<u64>,
    },

    /// Manage the watchlist file.
    Watchlist {
        #[command(subcommand)]
        action: WatchlistAction,
    },

    /// Holdings & P&L.
    Portfolio,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    List,
    Add {
        symbol: String,

        #[arg(long)]
        name: Option<String>,
    },
    Remove {
        symbol: String,
    },
    /// Replace the watchlist with a JSON array read from `path`.
    Import {
        path: PathBuf,
    },
    Export {
        path: PathBuf,
    },
    Clear,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_movers_segment() {
        let cli = Cli::try_parse_from(["dalal", "movers", "--segment", "midcap"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Movers {
                segment: MarketCapSegment::Medium
            }
        ));
        assert_eq!(cli.trace, TraceLevel::INFO);
        assert!(!cli.json);
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = Cli::try_parse_from(["dalal", "crypto", "--json", "--trace", "DEBUG"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.trace, TraceLevel::DEBUG);
    }

    #[test]
    fn rejects_unknown_segment() {
        assert!(Cli::try_parse_from(["dalal", "movers", "-s", "huge"]).is_err());
    }

    #[test]
    fn parses_watchlist_actions() {
        let cli = Cli::try_parse_from(["dalal", "watchlist", "add", "TCS", "--name", "Tata Consultancy"]).unwrap();
        match cli.command {
            Commands::Watchlist {
                action: WatchlistAction::Add { symbol, name },
            } => {
                assert_eq!(symbol, "TCS");
                assert_eq!(name.as_deref(), Some("Tata Consultancy"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn refresh_period_must_be_positive() {
        let err = Cli::try_parse_from(["dalal", "watch", "--every", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let cli = Cli::try_parse_from(["dalal", "watch", "--every", "5"]).unwrap();
        assert!(matches!(cli.command, Commands::Watch { every: Some(5), .. }));
    }

    #[test]
    fn parses_quote_and_listings() {
        let cli = Cli::try_parse_from(["dalal", "quote", "reliance"]).unwrap();
        assert!(matches!(cli.command, Commands::Quote { symbol } if symbol == "reliance"));

        let cli = Cli::try_parse_from(["dalal", "ipos", "--past"]).unwrap();
        assert!(matches!(cli.command, Commands::Ipos { past: true }));
        assert!(matches!(Cli::try_parse_from(["dalal", "news"]).unwrap().command, Commands::News));
        assert!(Cli::try_parse_from(["dalal", "quote"]).is_err());
    }
}
