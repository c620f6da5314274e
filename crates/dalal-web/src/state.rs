use dalal_warehouse::portfolio::Portfolio;
use dalal_warehouse::schema::crypto::{CoinGecko, CoinGeckoBitcoin, CoinGeckoMovers};
use dalal_warehouse::schema::news::{NewsFeed, Rss2Json};
use dalal_warehouse::schema::stock::{Nse, NseIndices, NseMovers, NsePastIpos, NseQuote, NseUpcomingIpos};
use dalal_warehouse::watchlist::Watchlist;
use dalal_warehouse::Config;
use reqwest::Client as HttpClient;

/// Everything the handlers share, behind one `web::Data`.
pub struct AppState {
    pub http_client: HttpClient,
    pub nse_movers: NseMovers,
    pub nse_indices: NseIndices,
    pub nse_quote: NseQuote,
    pub upcoming_ipos: NseUpcomingIpos,
    pub past_ipos: NsePastIpos,
    pub news: NewsFeed,
    pub crypto_movers: CoinGeckoMovers,
    pub bitcoin: CoinGeckoBitcoin,
    pub watchlist: Watchlist,
    pub portfolio: Portfolio,
}

impl AppState {
    pub fn new(config: &Config, http_client: HttpClient, watchlist: Watchlist) -> Self {
        let nse = Nse::from_config(config);
        let coingecko = CoinGecko::from_config(config);
        Self {
            http_client,
            nse_movers: NseMovers(nse.clone()),
            nse_indices: NseIndices(nse.clone()),
            nse_quote: NseQuote(nse.clone()),
            upcoming_ipos: NseUpcomingIpos(nse.clone()),
            past_ipos: NsePastIpos(nse),
            news: NewsFeed(Rss2Json::from_config(config)),
            crypto_movers: CoinGeckoMovers(coingecko.clone()),
            bitcoin: CoinGeckoBitcoin(coingecko),
            watchlist,
            portfolio: Portfolio::sample(),
        }
    }
}
