use std::time::Instant;

use actix_web::{get, post, web, HttpResponse, Responder};
use log::{error, info};

use crate::error::{ApiError, InferenceError};
use crate::models::{HealthStatus, PredictionRequest};
use crate::state::AppState;

#[post("/predict")]
pub async fn predict(
    state: web::Data<AppState>,
    input: web::Json<PredictionRequest>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let classifier = state.classifier.clone();
    let text = input.into_inner().text;

    let outcome = web::block(move || classifier.classify(&text))
        .await
        .map_err(InferenceError::from)
        .and_then(|result| result);

    match outcome {
        Ok(result) => {
            info!(
                "Prediction: {} ({:.3}) in {} ms",
                result.label,
                result.score,
                start_time.elapsed().as_millis()
            );
            Ok(HttpResponse::Ok().json(result))
        }
        Err(e) => {
            error!("Prediction failed: {}", e);
            Err(e.into())
        }
    }
}

#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::ok())
}

/// Registers the API routes and the JSON body handling shared by all of them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(10 * 1024 * 1024)
            .error_handler(|err, _req| ApiError::unprocessable(err.to_string()).into()),
    )
    .service(predict)
    .service(health)
    .default_service(web::route().to(|| async { Err::<HttpResponse, _>(ApiError::not_found()) }));
}
