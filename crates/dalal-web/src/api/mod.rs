use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::web;

pub mod crypto;
pub mod news;
pub mod portfolio;
pub mod stock;
pub mod watchlist;

/// NSE refreshes its variations roughly every few minutes.
pub const NSE_MAX_AGE: u32 = 300;
pub const COINGECKO_MAX_AGE: u32 = 60;
pub const QUOTE_MAX_AGE: u32 = 60;
/// Public issues & headlines change a few times a day.
pub const LISTINGS_MAX_AGE: u32 = 3600;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(stock::gainers_losers)
            .service(stock::indices)
            .service(stock::upcoming_ipos)
            .service(stock::past_ipos)
            // after every other `/stocks/...` route; it matches any single segment
            .service(stock::quote)
            .service(news::headlines)
            .service(crypto::gainers_losers)
            .service(crypto::bitcoin)
            .service(portfolio::summary)
            .service(watchlist::list)
            .service(watchlist::add)
            .service(watchlist::replace)
            .service(watchlist::clear)
            .service(watchlist::remove),
    );
}

fn cache_for(seconds: u32) -> CacheControl {
    CacheControl(vec![CacheDirective::Public, CacheDirective::MaxAge(seconds)])
}
