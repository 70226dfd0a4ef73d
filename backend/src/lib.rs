//! Sentiment classification over HTTP.
//!
//! A pretrained DistilBERT sst-2 model is loaded once at startup and served
//! through `POST /predict` and `GET /health`.

pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod routes;
pub mod state;

pub use error::{ApiError, InferenceError};
pub use inference::{DistilBertClassifier, SentimentClassifier};
pub use models::{Label, PredictionResult};
pub use state::AppState;
