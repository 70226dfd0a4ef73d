use crate::error::ConfigError;
use crate::inference::{ModelSource, DEFAULT_MODEL_ID, DEFAULT_REVISION};

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub model_id: String,
    pub model_revision: String,
    /// Repo holding the tokenizer files; the model repo unless overridden.
    pub tokenizer_id: String,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; unset or blank values take defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value: v,
            })?,
            None => 8000,
        };

        let workers = match var("WORKERS") {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "WORKERS",
                        expected: "a positive integer",
                        value: v,
                    })
                }
            },
            None => num_cpus::get(),
        };

        let model_id = var("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Ok(ServiceConfig {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            workers,
            tokenizer_id: var("TOKENIZER_ID").unwrap_or_else(|| model_id.clone()),
            model_id,
            model_revision: var("MODEL_REVISION").unwrap_or_else(|| DEFAULT_REVISION.to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn model_source(&self) -> ModelSource {
        ModelSource {
            model_id: self.model_id.clone(),
            revision: self.model_revision.clone(),
            tokenizer_id: self.tokenizer_id.clone(),
        }
    }
}
