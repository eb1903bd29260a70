//! Ledger orchestration: fetch-then-compute-then-persist cycles over the
//! document store, with per-event recompute coalescing.

pub mod coalesce;

pub use coalesce::RecomputeGate;

use crate::domain::{
    Bill, Currency, Decimal, Event, EventId, UserId, UserProfile,
};
use crate::engine::{compute_balances, BillDraft, ValidationError};
use crate::error::AppError;
use crate::rates::RateProvider;
use crate::store::{DocumentStore, IN_QUERY_CHUNK};
use chrono::Utc;
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Orchestrates event/bill mutations and balance recomputes.
///
/// All reads and writes go through the document store; currency conversion
/// goes through the rate provider before a bill reaches the builder. Racing
/// submissions resolve as last-write-wins on balances and self-heal on the
/// next recompute.
#[derive(Debug)]
pub struct LedgerService {
    store: Arc<dyn DocumentStore>,
    rates: Arc<dyn RateProvider>,
    settlement_currency: Currency,
    gate: RecomputeGate,
}

impl LedgerService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        rates: Arc<dyn RateProvider>,
        settlement_currency: Currency,
    ) -> Self {
        Self {
            store,
            rates,
            settlement_currency,
            gate: RecomputeGate::new(),
        }
    }

    pub fn settlement_currency(&self) -> &Currency {
        &self.settlement_currency
    }

    /// Register (or replace) a user profile.
    pub async fn create_user(&self, profile: UserProfile) -> Result<UserProfile, AppError> {
        self.store.put_user(&profile).await?;
        Ok(profile)
    }

    /// Create an event with the creator as sole roster member.
    ///
    /// The event insert and the creator's membership update land in one
    /// atomic batch: both or neither.
    pub async fn create_event(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        creator_id: UserId,
    ) -> Result<Event, AppError> {
        let mut profile = self
            .store
            .get_user(&creator_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", creator_id)))?;

        let event = Event::new(
            title,
            description,
            creator_id,
            profile.display_name.clone(),
            Utc::now(),
        );
        profile.add_membership(event.id.clone());

        self.store.put_event_and_user(&event, &profile).await?;
        info!(event_id = %event.id, creator = %event.creator_id, "event created");

        Ok(event)
    }

    /// Add a user to an event's roster with a zero-initialized balance.
    ///
    /// Idempotent: joining twice leaves the roster unchanged.
    pub async fn join_event(
        &self,
        event_id: &EventId,
        user_id: UserId,
    ) -> Result<Event, AppError> {
        let mut event = self.event(event_id).await?;
        let mut profile = self
            .store
            .get_user(&user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;

        if event.is_member(&user_id) {
            return Ok(event);
        }

        event.add_participant(user_id.clone(), profile.display_name.clone(), Utc::now());
        profile.add_membership(event_id.clone());

        self.store.put_event_and_user(&event, &profile).await?;
        self.gate.mark_dirty(event_id);
        info!(event_id = %event_id, user = %user_id, "participant joined");

        Ok(event)
    }

    /// Point-read an event.
    pub async fn event(&self, event_id: &EventId) -> Result<Event, AppError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {}", event_id)))
    }

    /// Fetch events by id set, fanned out in store-sized chunks and unioned.
    pub async fn events_by_ids(&self, ids: &[EventId]) -> Result<Vec<Event>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = ids
            .chunks(IN_QUERY_CHUNK)
            .map(|chunk| self.store.events_by_ids(chunk));
        let results = try_join_all(chunks).await?;
        Ok(results.into_iter().flatten().collect())
    }

    /// All bills recorded against an event.
    pub async fn bills(&self, event_id: &EventId) -> Result<Vec<Bill>, AppError> {
        Ok(self.store.bills_by_event(event_id).await?)
    }

    /// Users who could still be added to the event: everyone except the
    /// current user and existing roster members.
    pub async fn available_users(
        &self,
        event_id: &EventId,
        current_user: &UserId,
    ) -> Result<Vec<UserProfile>, AppError> {
        let event = self.event(event_id).await?;
        let users = self.store.list_users().await?;

        Ok(users
            .into_iter()
            .filter(|u| &u.user_id != current_user && !event.is_member(&u.user_id))
            .collect())
    }

    /// Submit a bill: convert to the settlement currency, build, persist,
    /// and refresh the event's aggregates and balances.
    ///
    /// A failed rate lookup aborts before any persistence; the raw entered
    /// amount never reaches the store.
    pub async fn add_bill(
        &self,
        event_id: &EventId,
        draft: BillDraft,
        creator_id: UserId,
    ) -> Result<Bill, AppError> {
        let event = self.event(event_id).await?;
        let creator = event
            .participant(&creator_id)
            .ok_or_else(|| {
                ValidationError::CreatorNotOnRoster(creator_id.as_str().to_string())
            })?
            .clone();

        let final_value = if draft.currency == self.settlement_currency {
            draft.value
        } else {
            let rate = self
                .rates
                .get_exchange_rate(&draft.currency, &self.settlement_currency)
                .await?;
            debug!(
                event_id = %event_id,
                from = %draft.currency,
                to = %self.settlement_currency,
                rate = %rate,
                "converted bill value"
            );
            draft.value * rate
        };

        let bill = draft.build(
            final_value,
            event_id.clone(),
            creator_id,
            &creator.display_name,
            Utc::now(),
        )?;

        self.store.insert_bill(&bill).await?;

        // Refetch rather than increment: the aggregate is defined as the sum
        // over the stored bill collection.
        let bills = self.store.bills_by_event(event_id).await?;
        let total = bills
            .iter()
            .fold(Decimal::zero(), |acc, b| acc + b.value);
        self.store.update_total_expenses(event_id, total).await?;

        self.gate.mark_dirty(event_id);
        self.balances(event_id).await?;

        info!(event_id = %event_id, bill_id = %bill.id, value = %bill.value, "bill recorded");
        Ok(bill)
    }

    /// Authoritative balances for an event, recomputed from the full bill
    /// history when stale.
    ///
    /// Coalesced per event: concurrent callers wait on the in-flight run and
    /// then either reuse its result or, if a mutation landed mid-flight, run
    /// once more. A failed recompute leaves the last-known map cached and
    /// re-marks the event dirty.
    pub async fn balances(
        &self,
        event_id: &EventId,
    ) -> Result<BTreeMap<UserId, Decimal>, AppError> {
        let slot = self.gate.slot(event_id);
        let mut cached = slot.lock.lock().await;

        if !slot.is_dirty() {
            if let Some(map) = cached.as_ref() {
                debug!(event_id = %event_id, "balances clean, serving cached map");
                return Ok(map.clone());
            }
        }

        slot.claim();
        match self.recompute_and_persist(event_id).await {
            Ok(fresh) => {
                *cached = Some(fresh.clone());
                Ok(fresh)
            }
            Err(err) => {
                slot.unclaim();
                Err(err)
            }
        }
    }

    /// One full recompute cycle: load roster and bills, rebuild the map from
    /// scratch, and persist it only if it differs from the stored one.
    async fn recompute_and_persist(
        &self,
        event_id: &EventId,
    ) -> Result<BTreeMap<UserId, Decimal>, AppError> {
        let event = self.event(event_id).await?;
        let bills = self.store.bills_by_event(event_id).await?;

        let balances = compute_balances(&event.participants, &bills);

        if balances != event.balances {
            self.store.update_balances(event_id, &balances).await?;
            info!(
                event_id = %event_id,
                bills = bills.len(),
                participants = event.participants.len(),
                "persisted recomputed balances"
            );
        } else {
            debug!(event_id = %event_id, "balances unchanged, skipping write");
        }

        Ok(balances)
    }
}
