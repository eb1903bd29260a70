//! Event type: a group activity with a roster and its own balance sheet.

use crate::domain::{Decimal, EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A roster member of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParticipant {
    /// Id of the user on the roster.
    pub user_id: UserId,
    /// Display name at the time of joining.
    pub display_name: String,
    /// When the membership was server-confirmed. `None` means the entry is
    /// pending (just added, not yet confirmed).
    pub joined_at: Option<DateTime<Utc>>,
    /// Informational snapshot; the authoritative value lives in
    /// [`Event::balances`].
    pub balance: Decimal,
}

impl EventParticipant {
    /// Create a pending roster entry with a zero balance.
    pub fn pending(user_id: UserId, display_name: impl Into<String>) -> Self {
        EventParticipant {
            user_id,
            display_name: display_name.into(),
            joined_at: None,
            balance: Decimal::zero(),
        }
    }

    /// Create a confirmed roster entry with a zero balance.
    pub fn joined(user_id: UserId, display_name: impl Into<String>, at: DateTime<Utc>) -> Self {
        EventParticipant {
            user_id,
            display_name: display_name.into(),
            joined_at: Some(at),
            balance: Decimal::zero(),
        }
    }
}

/// A group event: roster, bill aggregates, and the authoritative balance map.
///
/// Invariants: every key in `balances` corresponds to a roster member, and
/// `total_expenses` equals the sum of `value` over the event's bills (subject
/// to eventual consistency between racing recomputes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub creator_id: UserId,
    /// Roster; ordering carries no meaning.
    pub participants: Vec<EventParticipant>,
    /// Sum of all bill values, denominated in the settlement currency.
    pub total_expenses: Decimal,
    /// Net amount per roster member: positive = owes, negative = is owed.
    pub balances: BTreeMap<UserId, Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with the creator as the sole (pending) roster
    /// member and a zeroed balance sheet.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        creator_id: UserId,
        creator_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let creator = EventParticipant::pending(creator_id.clone(), creator_name);
        let mut balances = BTreeMap::new();
        balances.insert(creator_id.clone(), Decimal::zero());

        Event {
            id: EventId::generate(),
            title: title.into(),
            description: description.into(),
            creator_id,
            participants: vec![creator],
            total_expenses: Decimal::zero(),
            balances,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given user is on the roster.
    pub fn is_member(&self, user_id: &UserId) -> bool {
        self.participants.iter().any(|p| &p.user_id == user_id)
    }

    /// Find a roster entry by user id.
    pub fn participant(&self, user_id: &UserId) -> Option<&EventParticipant> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    /// Add a confirmed roster member with a zero-initialized balance entry.
    ///
    /// No-op if the user is already on the roster.
    pub fn add_participant(
        &mut self,
        user_id: UserId,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        if self.is_member(&user_id) {
            return;
        }
        self.participants
            .push(EventParticipant::joined(user_id.clone(), display_name, now));
        self.balances.insert(user_id, Decimal::zero());
        self.updated_at = now;
    }
}
