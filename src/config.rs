use crate::domain::Currency;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub rates_api_url: String,
    pub settlement_currency: Currency,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let rates_api_url = env_map
            .get("RATES_API_URL")
            .cloned()
            .unwrap_or_else(|| "https://api.frankfurter.app".to_string());

        let settlement_currency = match env_map
            .get("SETTLEMENT_CURRENCY")
            .map(|s| s.as_str())
            .unwrap_or("PLN")
        {
            code if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) => {
                Currency::new(code)
            }
            other => {
                return Err(ConfigError::InvalidValue(
                    "SETTLEMENT_CURRENCY".to_string(),
                    format!("must be a 3-letter currency code, got {}", other),
                ))
            }
        };

        Ok(Config {
            port,
            database_path,
            rates_api_url,
            settlement_currency,
        })
    }
}
