//! Rate provider backed by the Frankfurter (ECB) API.

use super::{RateError, RateProvider};
use crate::domain::{Currency, Decimal};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Rate provider querying the public Frankfurter API.
#[derive(Debug, Clone)]
pub struct FrankfurterRateProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, Decimal>,
}

impl FrankfurterRateProvider {
    /// Create a provider against the given API base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Create with the default public Frankfurter URL.
    pub fn default_url() -> Self {
        Self::new("https://api.frankfurter.app".to_string())
    }

    async fn fetch_latest(
        &self,
        from: &Currency,
        to: &Currency,
    ) -> Result<LatestResponse, RateError> {
        let url = format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            from.as_str(),
            to.as_str()
        );
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| backoff::Error::transient(RateError::Network(e.to_string())))?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(RateError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(RateError::Http {
                    status: status.as_u16(),
                    message: "server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(RateError::Http {
                    status: status.as_u16(),
                    message: "client error".to_string(),
                }));
            }

            response
                .json::<LatestResponse>()
                .await
                .map_err(|e| backoff::Error::permanent(RateError::Parse(e.to_string())))
        })
        .await
    }
}

#[async_trait]
impl RateProvider for FrankfurterRateProvider {
    async fn get_exchange_rate(
        &self,
        from: &Currency,
        to: &Currency,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::one());
        }

        debug!("fetching exchange rate {} -> {}", from, to);
        let latest = self.fetch_latest(from, to).await?;

        latest
            .rates
            .get(to.as_str())
            .copied()
            .ok_or_else(|| RateError::MissingRate {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
    }
}
