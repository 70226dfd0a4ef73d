use std::sync::Arc;

use crate::inference::SentimentClassifier;

/// Service context built once at startup and shared read-only by every worker.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn SentimentClassifier>,
}

impl AppState {
    pub fn new(classifier: impl SentimentClassifier + 'static) -> Self {
        AppState {
            classifier: Arc::new(classifier),
        }
    }
}
