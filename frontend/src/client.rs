use std::time::Duration;

use log::debug;
use reqwest::{Client, Url};

use crate::error::ClientError;
use crate::types::{PredictionRequest, PredictionResult};

/// Thin client for the inference API. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    predict_url: String,
}

impl ApiClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Use this constructor to inject a preconfigured `reqwest::Client`.
    pub fn with_client(client: Client, base_url: &Url) -> Self {
        let predict_url = format!("{}/predict", base_url.as_str().trim_end_matches('/'));
        ApiClient {
            client,
            predict_url,
        }
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }

    pub async fn analyze(&self, text: &str) -> Result<PredictionResult, ClientError> {
        debug!("POST {} ({} chars)", self.predict_url, text.len());

        let result = self
            .client
            .post(&self.predict_url)
            .json(&PredictionRequest { text })
            .send()
            .await?
            .error_for_status()?
            .json::<PredictionResult>()
            .await?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_url_appends_to_base_path() {
        let base = Url::parse("http://127.0.0.1:8000").unwrap();
        let client = ApiClient::with_client(Client::new(), &base);
        assert_eq!(client.predict_url(), "http://127.0.0.1:8000/predict");

        let base = Url::parse("https://example.com/sentiment/").unwrap();
        let client = ApiClient::with_client(Client::new(), &base);
        assert_eq!(client.predict_url(), "https://example.com/sentiment/predict");
    }
}
