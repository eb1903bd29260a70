//! In-progress bill draft and final bill assembly.

use crate::domain::{Bill, BillId, BillParticipant, Currency, Decimal, EventId, ShareType, UserId};
use crate::engine::share::{equal_share, format_share, recompute_shares};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Rejected Bill Builder input. Submission aborts before any persistence.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bill title must not be empty")]
    EmptyTitle,
    #[error("bill value must be positive, got {0}")]
    NonPositiveValue(String),
    #[error("bill creator {0} is not on the event roster")]
    CreatorNotOnRoster(String),
}

/// An in-progress bill: entered title, amount, input currency, and the
/// selected non-creator participants.
///
/// Every mutator returns a new draft with all shares recomputed, so the
/// recompute points are explicit rather than reactive. Shares held here are
/// provisional; [`BillDraft::build`] recomputes them from the final
/// (currency-converted) value at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    pub title: String,
    pub value: Decimal,
    pub currency: Currency,
    pub participants: Vec<BillParticipant>,
}

impl BillDraft {
    /// Start an empty draft in the given input currency.
    pub fn new(currency: Currency) -> Self {
        BillDraft {
            title: String::new(),
            value: Decimal::zero(),
            currency,
            participants: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Change the entered amount; recomputes every share.
    pub fn set_value(mut self, value: Decimal) -> Self {
        self.value = value;
        self.participants = recompute_shares(self.value, &self.participants);
        self
    }

    /// Select a participant to split with; recomputes every share.
    ///
    /// No-op if the user is already selected.
    pub fn add_participant(mut self, user_id: UserId, display_name: impl Into<String>) -> Self {
        if !self.participants.iter().any(|p| p.user_id == user_id) {
            self.participants
                .push(BillParticipant::selected(user_id, display_name));
            self.participants = recompute_shares(self.value, &self.participants);
        }
        self
    }

    /// Deselect a participant; recomputes every remaining share.
    pub fn remove_participant(mut self, user_id: &UserId) -> Self {
        self.participants.retain(|p| &p.user_id != user_id);
        self.participants = recompute_shares(self.value, &self.participants);
        self
    }

    /// Flip a participant's settled flag and re-sign their share.
    ///
    /// Only the toggled entry changes: the magnitude depends on the count
    /// and total, neither of which moved.
    pub fn toggle_paid(mut self, user_id: &UserId) -> Self {
        for p in &mut self.participants {
            if &p.user_id == user_id {
                p.has_paid = !p.has_paid;
                p.share = format_share(p.share.abs(), p.has_paid);
            }
        }
        self
    }

    /// Assemble the final immutable bill.
    ///
    /// `final_value` must already be converted to the event's settlement
    /// currency; a failed conversion aborts upstream and never reaches this
    /// point. All shares are recomputed from `final_value`, and the creator
    /// is folded in exactly once: appended with `has_paid = true`, or, if
    /// already among the selected participants, that entry is promoted to
    /// the creator entry instead of being duplicated.
    ///
    /// # Errors
    /// [`ValidationError`] on an empty title or non-positive value; nothing
    /// is persisted.
    pub fn build(
        &self,
        final_value: Decimal,
        event_id: EventId,
        creator_id: UserId,
        creator_name: &str,
        now: DateTime<Utc>,
    ) -> Result<Bill, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !final_value.is_positive() {
            return Err(ValidationError::NonPositiveValue(
                final_value.to_canonical_string(),
            ));
        }

        // +1 for the creator, whether or not they were explicitly selected.
        let per_participant = equal_share(final_value, self.participants.len() + 1);

        let mut creator_present = false;
        let mut participants: Vec<BillParticipant> = self
            .participants
            .iter()
            .map(|p| {
                if p.user_id == creator_id {
                    creator_present = true;
                    BillParticipant {
                        has_paid: true,
                        share: format_share(per_participant, true),
                        creator: true,
                        ..p.clone()
                    }
                } else {
                    BillParticipant {
                        share: format_share(per_participant, p.has_paid),
                        creator: false,
                        ..p.clone()
                    }
                }
            })
            .collect();

        if !creator_present {
            participants.push(BillParticipant {
                user_id: creator_id.clone(),
                display_name: creator_name.to_string(),
                has_paid: true,
                share: format_share(per_participant, true),
                share_type: ShareType::Equal,
                creator: true,
            });
        }

        Ok(Bill {
            id: BillId::generate(),
            title: self.title.clone(),
            value: final_value,
            creator_id,
            event_id,
            participants,
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-01-01T12:00:00Z".parse().unwrap()
    }

    fn draft(title: &str, value: &str, others: &[&str]) -> BillDraft {
        let mut draft = BillDraft::new(Currency::new("PLN")).with_title(title);
        for id in others {
            draft = draft.add_participant(UserId::new(*id), *id);
        }
        draft.set_value(d(value))
    }

    #[test]
    fn test_build_appends_creator_once() {
        let bill = draft("Dinner", "100", &["bob"])
            .build(d("100"), EventId::new("e1"), UserId::new("alice"), "Alice", now())
            .unwrap();

        assert_eq!(bill.participants.len(), 2);
        let creators: Vec<_> = bill.participants.iter().filter(|p| p.creator).collect();
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].user_id, UserId::new("alice"));
        assert!(creators[0].has_paid);
        assert_eq!(creators[0].share, d("-50"));
    }

    #[test]
    fn test_build_promotes_already_selected_creator() {
        // The creator was selected like any other participant; the entry is
        // promoted rather than duplicated.
        let bill = draft("Dinner", "100", &["alice", "bob"])
            .build(d("100"), EventId::new("e1"), UserId::new("alice"), "Alice", now())
            .unwrap();

        assert_eq!(bill.participants.len(), 2);
        let creators: Vec<_> = bill.participants.iter().filter(|p| p.creator).collect();
        assert_eq!(creators.len(), 1);
        assert!(creators[0].has_paid);
        // Count still includes the creator exactly once: 100 / 3.
        assert_eq!(creators[0].share, d("-33.3"));
    }

    #[test]
    fn test_build_uses_converted_value_not_draft_value() {
        // Entered 25 EUR, converted upstream to 107.5 PLN.
        let bill = draft("Tickets", "25", &["bob"])
            .build(d("107.5"), EventId::new("e1"), UserId::new("alice"), "Alice", now())
            .unwrap();

        assert_eq!(bill.value, d("107.5"));
        let bob = bill
            .participants
            .iter()
            .find(|p| p.user_id == UserId::new("bob"))
            .unwrap();
        assert_eq!(bob.share, d("53.8"));
    }

    #[test]
    fn test_build_rejects_empty_title() {
        let err = draft("  ", "100", &["bob"])
            .build(d("100"), EventId::new("e1"), UserId::new("alice"), "Alice", now())
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
    }

    #[test]
    fn test_build_rejects_non_positive_value() {
        let err = draft("Dinner", "0", &["bob"])
            .build(d("0"), EventId::new("e1"), UserId::new("alice"), "Alice", now())
            .unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveValue(_)));
    }

    #[test]
    fn test_mutators_recompute_all_shares() {
        let draft = draft("Dinner", "90", &["bob", "carol"]);
        // 90 over 3 (two selected + creator).
        assert!(draft.participants.iter().all(|p| p.share == d("30")));

        let draft = draft.remove_participant(&UserId::new("carol"));
        // 90 over 2.
        assert_eq!(draft.participants.len(), 1);
        assert_eq!(draft.participants[0].share, d("45"));

        let draft = draft.set_value(d("60"));
        assert_eq!(draft.participants[0].share, d("30"));
    }

    #[test]
    fn test_toggle_paid_resigns_single_share() {
        let draft = draft("Dinner", "90", &["bob", "carol"]);
        let draft = draft.toggle_paid(&UserId::new("bob"));

        let bob = &draft.participants[0];
        let carol = &draft.participants[1];
        assert!(bob.has_paid);
        assert_eq!(bob.share, d("-30"));
        assert!(!carol.has_paid);
        assert_eq!(carol.share, d("30"));

        // Toggling back restores the owed sign.
        let draft = draft.toggle_paid(&UserId::new("bob"));
        assert_eq!(draft.participants[0].share, d("30"));
    }

    #[test]
    fn test_add_participant_twice_is_noop() {
        let draft = draft("Dinner", "100", &["bob"]).add_participant(UserId::new("bob"), "bob");
        assert_eq!(draft.participants.len(), 1);
    }
}
