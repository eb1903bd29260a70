pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod rates;
pub mod store;

pub use config::Config;
pub use domain::{
    Bill, BillId, BillParticipant, Currency, Decimal, Event, EventId, EventParticipant, ShareType,
    UserId, UserProfile,
};
pub use error::AppError;
pub use ledger::LedgerService;
pub use rates::{FixedRateProvider, FrankfurterRateProvider, RateError, RateProvider};
pub use store::{DocumentStore, MemoryStore, SqliteStore, StoreError};
