//! Bill type: a single recorded expense, paid in full by its creator.

use crate::domain::{BillId, Decimal, EventId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a participant's share of a bill is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    /// Equal split across all participants (including the creator).
    Equal,
    /// Reserved. Declared for forward compatibility with per-participant
    /// fixed amounts; the share computation never consumes it.
    Fixed,
}

/// One participant's stake in a bill.
///
/// The sign of `share` encodes payment direction: positive while the
/// participant still owes their share, negative (or zero) once settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillParticipant {
    pub user_id: UserId,
    pub display_name: String,
    /// Whether this participant has settled their share with the creator.
    pub has_paid: bool,
    /// Signed share amount; see [`crate::engine::share::format_share`].
    pub share: Decimal,
    pub share_type: ShareType,
    /// True for exactly one participant per bill.
    pub creator: bool,
}

impl BillParticipant {
    /// Create a freshly selected non-creator participant: unpaid, zero share
    /// until the next recompute.
    pub fn selected(user_id: UserId, display_name: impl Into<String>) -> Self {
        BillParticipant {
            user_id,
            display_name: display_name.into(),
            has_paid: false,
            share: Decimal::zero(),
            share_type: ShareType::Equal,
            creator: false,
        }
    }
}

/// A single recorded expense belonging to an event.
///
/// `value` is always denominated in the event's settlement currency,
/// regardless of the currency the amount was entered in. Bills are created
/// atomically and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub title: String,
    /// Non-negative amount in the settlement currency.
    pub value: Decimal,
    /// Must equal the user id of the one participant with `creator = true`.
    pub creator_id: UserId,
    /// Owning event.
    pub event_id: EventId,
    /// Participant set; ordering carries no meaning.
    pub participants: Vec<BillParticipant>,
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// The participant entry flagged as creator, if the invariant holds.
    pub fn creator(&self) -> Option<&BillParticipant> {
        self.participants.iter().find(|p| p.creator)
    }
}
