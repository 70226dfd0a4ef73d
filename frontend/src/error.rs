use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection refused, timeout, non-2xx status or an undecodable body.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("API_URL '{value}' is not a usable base URL: {reason}")]
    ApiUrl { value: String, reason: String },

    #[error("{name} must be {expected} (got '{value}')")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}
