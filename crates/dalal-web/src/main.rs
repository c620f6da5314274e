use actix_web::{middleware::Logger, web, App, HttpServer};
use dalal_warehouse::watchlist::{JsonFileRepository, Watchlist};
use dalal_warehouse::Config;
use log::info;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod state;

use state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let http_client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(10))
        .build()?;
    let watchlist = Watchlist::new(Arc::new(JsonFileRepository::new(&config.watchlist_path)));

    let state = web::Data::new(AppState::new(&config, http_client, watchlist));
    info!(
        "serving on {} (watchlist at {})",
        config.bind_addr,
        config.watchlist_path.display()
    );

    // run server
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(api::routes)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await?;

    Ok(())
}
