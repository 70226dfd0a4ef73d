use actix_web::{error, get, post, web, HttpResponse};
use log::{info, warn};

use crate::client::ApiClient;
use crate::render::{Outcome, Pages, DEFAULT_TEXT};
use crate::types::AnalyzeForm;

pub struct UiState {
    pub client: ApiClient,
    pub pages: Pages,
}

fn page(state: &UiState, text: &str, outcome: &Outcome) -> actix_web::Result<HttpResponse> {
    let html = state
        .pages
        .index(text, outcome)
        .map_err(error::ErrorInternalServerError)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

#[get("/")]
pub async fn index(state: web::Data<UiState>) -> actix_web::Result<HttpResponse> {
    page(&state, DEFAULT_TEXT, &Outcome::Idle)
}

#[post("/")]
pub async fn analyze(
    state: web::Data<UiState>,
    form: web::Form<AnalyzeForm>,
) -> actix_web::Result<HttpResponse> {
    let text = form.into_inner().text;

    let outcome = match state.client.analyze(&text).await {
        Ok(result) => {
            info!("Analysis: {} ({:.2})", result.label, result.score);
            Outcome::Rendered(result)
        }
        Err(e) => {
            warn!("API call to {} failed: {}", state.client.predict_url(), e);
            Outcome::ErrorShown(format!("Error talking to the API: {e}"))
        }
    };

    page(&state, &text, &outcome)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(index).service(analyze);
}
