use super::{cache_for, LISTINGS_MAX_AGE, NSE_MAX_AGE, QUOTE_MAX_AGE};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use dalal_warehouse::schema::stock::MarketCapSegment;
use dalal_warehouse::Api;
use serde::Deserialize;

////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MoversQuery {
    market_cap: Option<String>,
}

/// Top 5 NSE gainers & losers for a market-cap segment (`small`, `medium` or `large`; anything
/// else is `large`).
///
/// ```json
/// {
///     "gainers": [{ "symbol": "TATAMOTORS", "name": "Tata Motors Ltd.", "price": 785.4, "change": 32.15, "changePercent": 4.27 }, ...],
///     "losers": [...]
/// }
/// ```
#[get("/stocks/gainers-losers")]
pub async fn gainers_losers(query: web::Query<MoversQuery>, state: web::Data<AppState>) -> impl Responder {
    let segment = MarketCapSegment::parse_or_default(query.market_cap.as_deref());
    let movers = state.nse_movers.serve(&state.http_client, &segment).await;

    HttpResponse::Ok()
        .insert_header(cache_for(NSE_MAX_AGE))
        .json(movers)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Headline NSE indices.
#[get("/market/indices")]
pub async fn indices(state: web::Data<AppState>) -> impl Responder {
    let indices = state.nse_indices.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(NSE_MAX_AGE))
        .json(indices)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Issues open for bidding, `{ "ipos": [...] }`.
#[get("/stocks/upcoming-ipos")]
pub async fn upcoming_ipos(state: web::Data<AppState>) -> impl Responder {
    let ipos = state.upcoming_ipos.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(LISTINGS_MAX_AGE))
        .json(ipos)
}

/// Recently listed issues, `{ "pastIssues": [...] }`.
#[get("/stocks/past-ipos")]
pub async fn past_ipos(state: web::Data<AppState>) -> impl Responder {
    let past = state.past_ipos.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(LISTINGS_MAX_AGE))
        .json(past)
}

/// Full quote for one equity, `{ "stock": {...} }`; the symbol is case-insensitive.
#[get("/stocks/{symbol}")]
pub async fn quote(symbol: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let quote = state.nse_quote.serve(&state.http_client, &symbol.into_inner()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(QUOTE_MAX_AGE))
        .json(quote)
}

#[cfg(test)]
mod tests {
    use super::super::testing::{state, DEAD};
    use actix_web::http::header::CACHE_CONTROL;
    use actix_web::{test, App};
    use dalal_warehouse::schema::stock::indices::FALLBACK;
    use dalal_warehouse::schema::stock::movers::fallback;
    use dalal_warehouse::schema::stock::ipo::{PAST_FALLBACK, UPCOMING_FALLBACK};
    use dalal_warehouse::schema::stock::{MarketCapSegment, PastIpos, StockQuote, UpcomingIpos};
    use dalal_warehouse::schema::Movers;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[actix_web::test]
    async fn unknown_segment_falls_back_to_large() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;

        for uri in [
            "/api/stocks/gainers-losers",
            "/api/stocks/gainers-losers?marketCap=huge",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert!(resp.status().is_success());
            assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap().to_str().unwrap(), "public, max-age=300");

            let movers: Movers = test::read_body_json(resp).await;
            assert_eq!(movers, fallback(MarketCapSegment::Large));
        }
    }

    #[actix_web::test]
    async fn segment_selects_its_fallback_table() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/stocks/gainers-losers?marketCap=small")
            .to_request();
        let movers: Movers = test::call_and_read_body_json(&app, req).await;
        assert_eq!(movers, fallback(MarketCapSegment::Small));
    }

    #[actix_web::test]
    async fn serves_live_movers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "nsit=abc; Path=/"))
            .mount(&server)
            .await;
        for (index, pct) in [("gainers", 3.5), ("losers", -2.5)] {
            Mock::given(method("GET"))
                .and(path("/api/live-analysis-variations"))
                .and(query_param("index", index))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "NIFTY": {"data": [{"symbol": index.to_uppercase(), "lastPrice": 100.0, "pChange": pct}]}
                })))
                .mount(&server)
                .await;
        }

        let app = test::init_service(App::new().app_data(state(&server.uri())).configure(crate::api::routes)).await;
        let req = test::TestRequest::get()
            .uri("/api/stocks/gainers-losers?marketCap=large")
            .to_request();
        let movers: Movers = test::call_and_read_body_json(&app, req).await;

        assert_eq!(movers.gainers.len(), 1);
        assert_eq!(movers.gainers[0].symbol, "GAINERS");
        assert_eq!(movers.losers[0].symbol, "LOSERS");
    }

    #[actix_web::test]
    async fn indices_fall_back() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;
        let req = test::TestRequest::get().uri("/api/market/indices").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, serde_json::to_value(&*FALLBACK).unwrap());
    }

    #[actix_web::test]
    async fn quote_for_unknown_symbol_is_a_placeholder() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/stocks/tcs").to_request()).await;
        assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap().to_str().unwrap(), "public, max-age=60");

        let quote: StockQuote = test::read_body_json(resp).await;
        assert_eq!(quote.stock.symbol, "TCS");
        assert_eq!(quote.stock.price, 3421.50);

        let req = test::TestRequest::get().uri("/api/stocks/nykaa").to_request();
        let quote: StockQuote = test::call_and_read_body_json(&app, req).await;
        assert_eq!(quote.stock.name, "NYKAA Ltd.");
    }

    #[actix_web::test]
    async fn serves_live_quote() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "nsit=abc; Path=/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/quote-equity"))
            .and(query_param("symbol", "M&M"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "info": {"companyName": "Mahindra & Mahindra Limited"},
                "priceInfo": {"lastPrice": 3010.5, "change": -4.5, "pChange": -0.15}
            })))
            .mount(&server)
            .await;

        let app = test::init_service(App::new().app_data(state(&server.uri())).configure(crate::api::routes)).await;
        let req = test::TestRequest::get().uri("/api/stocks/m&m").to_request();
        let quote: StockQuote = test::call_and_read_body_json(&app, req).await;

        assert_eq!(quote.stock.symbol, "M&M");
        assert_eq!(quote.stock.name, "Mahindra & Mahindra Limited");
        assert_eq!(quote.stock.change, -4.5);
    }

    #[actix_web::test]
    async fn ipo_routes_are_not_quotes() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/api/stocks/upcoming-ipos").to_request()).await;
        assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap().to_str().unwrap(), "public, max-age=3600");
        let upcoming: UpcomingIpos = test::read_body_json(resp).await;
        assert_eq!(upcoming, *UPCOMING_FALLBACK);

        let req = test::TestRequest::get().uri("/api/stocks/past-ipos").to_request();
        let past: PastIpos = test::call_and_read_body_json(&app, req).await;
        assert_eq!(past, *PAST_FALLBACK);
    }

    #[actix_web::test]
    async fn empty_live_ipo_list_is_not_replaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "nsit=abc; Path=/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/ipo-current-issue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let app = test::init_service(App::new().app_data(state(&server.uri())).configure(crate::api::routes)).await;
        let req = test::TestRequest::get().uri("/api/stocks/upcoming-ipos").to_request();
        let upcoming: UpcomingIpos = test::call_and_read_body_json(&app, req).await;
        assert!(upcoming.ipos.is_empty());
    }
}
