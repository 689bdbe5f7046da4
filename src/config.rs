use std::env;
use std::time::Duration;

use crate::error::{AppError, Result};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Runtime configuration, loaded from the environment (a `.env` file is
/// honored when present, see `main.rs`).
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    /// Staff credentials for the binary's own session. Library users that
    /// drive `SessionContext::login` directly can leave these unset.
    pub cpf: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = env::var("SUPERA_API_BASE_URL")
            .map_err(|_| AppError::Config("SUPERA_API_BASE_URL is not set".to_string()))?;

        let timeout = match env::var("SUPERA_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::Config(format!("SUPERA_TIMEOUT_SECS is not a number: {}", raw))
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_base_url,
            cpf: env::var("SUPERA_CPF").ok(),
            password: env::var("SUPERA_PASSWORD").ok(),
            timeout,
        })
    }

    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            cpf: None,
            password: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
