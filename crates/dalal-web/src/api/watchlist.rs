use crate::state::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use dalal_warehouse::schema::stock::quote::normalize_symbol;
use dalal_warehouse::watchlist::{StoreError, WatchItem};
use log::error;

fn storage_failure(e: StoreError) -> HttpResponse {
    error!("watchlist: {e}");
    HttpResponse::InternalServerError().body("Watchlist storage failed")
}

#[get("/watchlist")]
pub async fn list(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.watchlist.items().await)
}

/// Append an item, unless its symbol is already watched (409).
#[post("/watchlist")]
pub async fn add(item: web::Json<WatchItem>, state: web::Data<AppState>) -> impl Responder {
    let mut item = item.into_inner();
    item.symbol = normalize_symbol(&item.symbol);
    if item.symbol.is_empty() {
        return HttpResponse::BadRequest().body("symbol is required");
    }

    match state.watchlist.add(item.clone()).await {
        Ok(true) => HttpResponse::Created().json(item),
        Ok(false) => HttpResponse::Conflict().body(format!("{} is already watched", item.symbol)),
        Err(e) => storage_failure(e),
    }
}

/// Replace the whole list, e.g., when importing.
#[put("/watchlist")]
pub async fn replace(items: web::Json<Vec<WatchItem>>, state: web::Data<AppState>) -> impl Responder {
    match state.watchlist.replace_all(items.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(state.watchlist.items().await),
        Err(e) => storage_failure(e),
    }
}

#[delete("/watchlist")]
pub async fn clear(state: web::Data<AppState>) -> impl Responder {
    match state.watchlist.clear().await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => storage_failure(e),
    }
}

#[delete("/watchlist/{symbol}")]
pub async fn remove(path: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let symbol = path.into_inner();
    match state.watchlist.remove(&symbol).await {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().body(format!("{symbol} is not watched")),
        Err(e) => storage_failure(e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{state, DEAD};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use dalal_warehouse::watchlist::WatchItem;
    use serde_json::json;

    #[actix_web::test]
    async fn add_list_remove() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;

        let add = |body: serde_json::Value| test::TestRequest::post().uri("/api/watchlist").set_json(body).to_request();
        let resp = test::call_service(&app, add(json!({"symbol": "TCS", "name": "TCS", "price": 3421.5}))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let resp = test::call_service(&app, add(json!({"symbol": "TCS"}))).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let resp = test::call_service(&app, add(json!({"symbol": " "}))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/watchlist").to_request();
        let items: Vec<WatchItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].extra["price"], json!(3421.5));

        let remove = || test::TestRequest::delete().uri("/api/watchlist/TCS").to_request();
        assert_eq!(test::call_service(&app, remove()).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(test::call_service(&app, remove()).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn symbols_are_normalized() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;

        let add = |symbol: &str| {
            test::TestRequest::post()
                .uri("/api/watchlist")
                .set_json(json!({ "symbol": symbol }))
                .to_request()
        };
        let resp = test::call_service(&app, add("tcs")).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: WatchItem = test::read_body_json(resp).await;
        assert_eq!(created.symbol, "TCS");
        assert_eq!(test::call_service(&app, add(" TCS")).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::delete().uri("/api/watchlist/tcs").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn replace_then_clear() {
        let app = test::init_service(App::new().app_data(state(DEAD)).configure(crate::api::routes)).await;

        let req = test::TestRequest::put()
            .uri("/api/watchlist")
            .set_json(json!([{"symbol": "PNB"}, {"symbol": "INFY"}]))
            .to_request();
        let items: Vec<WatchItem> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(items.len(), 2);

        let req = test::TestRequest::delete().uri("/api/watchlist").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/api/watchlist").to_request();
        let items: Vec<WatchItem> = test::call_and_read_body_json(&app, req).await;
        assert!(items.is_empty());
    }
}
