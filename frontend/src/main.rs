use actix_files::Files;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::Context;
use log::info;

use sentiment_ui::config::{UiConfig, REQUEST_TIMEOUT};
use sentiment_ui::render::Pages;
use sentiment_ui::{routes, ApiClient, UiState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = UiConfig::from_env().context("invalid UI configuration")?;
    let client = ApiClient::new(&config.api_url, REQUEST_TIMEOUT)?;
    let pages = Pages::new().context("failed to compile page templates")?;

    info!("Sentiment API at {}", client.predict_url());

    let state = web::Data::new(UiState { client, pages });
    let static_dir = config.static_dir.clone();
    let bind_address = config.bind_address();

    info!("UI available on http://{}/", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .app_data(state.clone())
            .configure(routes::configure)
            .service(Files::new("/static", static_dir.clone()).prefer_utf8(true))
            .default_service(web::route().to(|| async { HttpResponse::NotFound().body("Not Found") }))
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
