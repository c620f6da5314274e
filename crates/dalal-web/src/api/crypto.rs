use super::{cache_for, COINGECKO_MAX_AGE};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use dalal_warehouse::Api;

/// 24h crypto gainers & losers among the top 250 coins by market cap.
#[get("/crypto/gainers-losers")]
pub async fn gainers_losers(state: web::Data<AppState>) -> impl Responder {
    let movers = state.crypto_movers.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(COINGECKO_MAX_AGE))
        .json(movers)
}

/// ```json
/// { "bitcoin": { "symbol": "BTC", "name": "Bitcoin", "priceUSD": 43250.5, "priceINR": 3598000.0, "change24h": 2.45, ... } }
/// ```
#[get("/crypto/bitcoin")]
pub async fn bitcoin(state: web::Data<AppState>) -> impl Responder {
    let quote = state.bitcoin.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(COINGECKO_MAX_AGE))
        .json(quote)
}
