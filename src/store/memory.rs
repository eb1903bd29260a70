//! In-memory document store for tests and ephemeral runs.

use super::{DocumentStore, StoreError, IN_QUERY_CHUNK};
use crate::domain::{Bill, Decimal, Event, EventId, UserId, UserProfile};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// Document store backed by process-local maps.
///
/// Honors the same contract as the persistent store, including the
/// membership-query chunk limit. Counts balance writes so tests can assert
/// the engine's change-detection skips redundant persists.
#[derive(Debug, Default)]
pub struct MemoryStore {
    events: RwLock<HashMap<EventId, Event>>,
    bills: RwLock<HashMap<EventId, Vec<Bill>>>,
    users: RwLock<HashMap<UserId, UserProfile>>,
    balance_writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `update_balances` has persisted a map.
    pub fn balance_writes(&self) -> usize {
        self.balance_writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn put_event(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .await
            .insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn events_by_ids(&self, ids: &[EventId]) -> Result<Vec<Event>, StoreError> {
        if ids.len() > IN_QUERY_CHUNK {
            return Err(StoreError::ChunkTooLarge(ids.len()));
        }
        let events = self.events.read().await;
        Ok(ids.iter().filter_map(|id| events.get(id).cloned()).collect())
    }

    async fn update_balances(
        &self,
        id: &EventId,
        balances: &BTreeMap<UserId, Decimal>,
    ) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| StoreError::Io(format!("event {} missing on balance write", id)))?;
        event.balances = balances.clone();
        self.balance_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_total_expenses(&self, id: &EventId, total: Decimal) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(id)
            .ok_or_else(|| StoreError::Io(format!("event {} missing on total write", id)))?;
        event.total_expenses = total;
        Ok(())
    }

    async fn bills_by_event(&self, event_id: &EventId) -> Result<Vec<Bill>, StoreError> {
        Ok(self
            .bills
            .read()
            .await
            .get(event_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_bill(&self, bill: &Bill) -> Result<(), StoreError> {
        self.bills
            .write()
            .await
            .entry(bill.event_id.clone())
            .or_default()
            .push(bill.clone());
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn put_user(&self, user: &UserProfile) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn users_by_ids(&self, ids: &[UserId]) -> Result<Vec<UserProfile>, StoreError> {
        if ids.len() > IN_QUERY_CHUNK {
            return Err(StoreError::ChunkTooLarge(ids.len()));
        }
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn list_users(&self) -> Result<Vec<UserProfile>, StoreError> {
        let mut users: Vec<UserProfile> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        Ok(users)
    }

    async fn put_event_and_user(
        &self,
        event: &Event,
        user: &UserProfile,
    ) -> Result<(), StoreError> {
        // Both maps are updated under write locks held together, so no
        // reader observes one write without the other.
        let mut events = self.events.write().await;
        let mut users = self.users.write().await;
        events.insert(event.id.clone(), event.clone());
        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }
}
