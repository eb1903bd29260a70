//! Currency rate provider abstraction.
//!
//! The engine never fetches rates itself; the ledger converts an entered
//! amount to the settlement currency before it reaches the bill builder, and
//! a failed lookup aborts the submission rather than falling back to the
//! unconverted amount.

use crate::domain::{Currency, Decimal};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod fixed;
pub mod frankfurter;

pub use fixed::FixedRateProvider;
pub use frankfurter::FrankfurterRateProvider;

/// Error type for rate lookups.
#[derive(Debug, Clone, Error)]
pub enum RateError {
    /// Network error (connection timeout, DNS failure).
    #[error("network error: {0}")]
    Network(String),
    /// HTTP error from the rate API.
    #[error("http error {status}: {message}")]
    Http { status: u16, message: String },
    /// Response did not parse or lacked the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// The provider knows no rate for the requested pair.
    #[error("no rate available for {from} -> {to}")]
    MissingRate { from: String, to: String },
    /// Rate limited by the provider; retries exhausted.
    #[error("rate limited")]
    RateLimited,
}

/// Source of exchange-rate multipliers between currency pairs.
#[async_trait]
pub trait RateProvider: Send + Sync + fmt::Debug {
    /// Multiplier converting an amount in `from` into `to`.
    ///
    /// Implementations return 1 for identical codes without I/O.
    async fn get_exchange_rate(&self, from: &Currency, to: &Currency)
        -> Result<Decimal, RateError>;
}
