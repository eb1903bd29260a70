//! Document store abstraction for events, bills, and user profiles.
//!
//! The engine only needs point reads by id, equality-filtered queries,
//! membership-in-id-set queries, and a small atomic batch write. Membership
//! queries carry at most [`IN_QUERY_CHUNK`] ids each; callers chunk larger
//! sets and union the results.

use crate::domain::{Bill, Decimal, Event, EventId, UserId, UserProfile};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Maximum number of ids a single membership query may carry.
pub const IN_QUERY_CHUNK: usize = 10;

/// Error type for document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (connection, disk, pool).
    #[error("store I/O error: {0}")]
    Io(String),
    /// A stored document failed to decode.
    #[error("corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },
    /// A membership query exceeded [`IN_QUERY_CHUNK`] ids.
    #[error("membership query limited to {IN_QUERY_CHUNK} ids, got {0}")]
    ChunkTooLarge(usize),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

/// Document store contract for the ledger's read/write cycles.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Point-read an event by id.
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError>;

    /// Insert or replace an event document.
    async fn put_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Fetch the events whose ids are in the given set.
    ///
    /// At most [`IN_QUERY_CHUNK`] ids per call; missing ids are skipped, not
    /// errors.
    async fn events_by_ids(&self, ids: &[EventId]) -> Result<Vec<Event>, StoreError>;

    /// Overwrite an event's persisted balance map.
    async fn update_balances(
        &self,
        id: &EventId,
        balances: &BTreeMap<UserId, Decimal>,
    ) -> Result<(), StoreError>;

    /// Overwrite an event's aggregate expense total.
    async fn update_total_expenses(&self, id: &EventId, total: Decimal) -> Result<(), StoreError>;

    /// All bills belonging to an event (equality-filtered query).
    async fn bills_by_event(&self, event_id: &EventId) -> Result<Vec<Bill>, StoreError>;

    /// Append a newly created bill.
    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError>;

    /// Point-read a user profile by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError>;

    /// Insert or replace a user profile.
    async fn put_user(&self, user: &UserProfile) -> Result<(), StoreError>;

    /// Fetch the profiles whose ids are in the given set.
    ///
    /// At most [`IN_QUERY_CHUNK`] ids per call.
    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError>;

    /// All registered profiles (picker support).
    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError>;

    /// Atomically write an event together with a user's membership update:
    /// both documents land or neither does.
    async fn put_event_and_user(
        &self,
        event: &Event,
        user: &UserProfile,
    ) -> Result<(), StoreError>;
}
