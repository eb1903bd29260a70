//! Fixed-table rate provider for tests and offline runs.

use super::{RateError, RateProvider};
use crate::domain::{Currency, Decimal};
use async_trait::async_trait;
use std::collections::HashMap;

/// Rate provider answering from a static table.
#[derive(Debug, Clone, Default)]
pub struct FixedRateProvider {
    rates: HashMap<(Currency, Currency), Decimal>,
}

impl FixedRateProvider {
    /// Create a provider with an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rate for a currency pair.
    pub fn with_rate(mut self, from: Currency, to: Currency, rate: Decimal) -> Self {
        self.rates.insert((from, to), rate);
        self
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn get_exchange_rate(
        &self,
        from: &Currency,
        to: &Currency,
    ) -> Result<Decimal, RateError> {
        if from == to {
            return Ok(Decimal::one());
        }

        self.rates
            .get(&(from.clone(), to.clone()))
            .copied()
            .ok_or_else(|| RateError::MissingRate {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
    }
}
