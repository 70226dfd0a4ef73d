use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorDetail;

/// Failures while loading or running the classifier.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Model download failed: {0}")]
    Download(String),

    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Invalid model configuration: {0}")]
    ModelConfig(String),

    #[error("Inference task failed: {0}")]
    Execution(String),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InferenceError>;

impl From<hf_hub::api::sync::ApiError> for InferenceError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        InferenceError::Download(value.to_string())
    }
}

impl From<actix_web::error::BlockingError> for InferenceError {
    fn from(value: actix_web::error::BlockingError) -> Self {
        InferenceError::Execution(value.to_string())
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be {expected} (got '{value}')")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Error rendered at the HTTP boundary as `{"detail": ...}`.
#[derive(Error, Debug)]
#[error("{detail}")]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        ApiError {
            status,
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not Found")
    }
}

// Every inference failure is reported as a client error, whatever its cause.
impl From<InferenceError> for ApiError {
    fn from(value: InferenceError) -> Self {
        ApiError::bad_request(value.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorDetail::new(self.detail.clone()))
    }
}
