use super::{cache_for, LISTINGS_MAX_AGE};
use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use dalal_warehouse::Api;

/// Latest market headlines, `{ "articles": [...] }`.
#[get("/news")]
pub async fn headlines(state: web::Data<AppState>) -> impl Responder {
    let news = state.news.serve(&state.http_client, &()).await;

    HttpResponse::Ok()
        .insert_header(cache_for(LISTINGS_MAX_AGE))
        .json(news)
}
