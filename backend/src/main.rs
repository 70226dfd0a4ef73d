use actix_cors::Cors;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use log::{error, info};

use sentiment_api::config::ServiceConfig;
use sentiment_api::{routes, AppState, DistilBertClassifier};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .format_module_path(false)
        .init();

    let config = ServiceConfig::from_env().context("invalid service configuration")?;

    info!("Starting sentiment API");
    info!(
        "Loading model {} @ {} (tokenizer from {})",
        config.model_id, config.model_revision, config.tokenizer_id
    );

    // The listener is not bound until the model is ready.
    let classifier = match DistilBertClassifier::load(&config.model_source()) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("Model load failed: {}", e);
            return Err(e).context("could not load the sentiment model");
        }
    };
    let state = web::Data::new(AppState::new(classifier));
    info!("Model {} ready", state.classifier.model_id());

    let bind_address = config.bind_address();
    info!("Listening on http://{} ({} workers)", bind_address, config.workers);
    info!("   POST /predict  - classify text");
    info!("   GET  /health   - liveness probe");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .workers(config.workers)
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}
