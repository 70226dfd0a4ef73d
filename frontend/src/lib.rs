//! Browser front end for the sentiment API: a form, one API call per
//! submission, and a result card with a probability chart.

pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod render;
pub mod routes;
pub mod types;

pub use client::ApiClient;
pub use routes::UiState;
