use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};

/// Holdings with per-row P&L, plus book totals.
#[get("/portfolio")]
pub async fn summary(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.portfolio.summary())
}
