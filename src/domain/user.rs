//! User profile record used for roster display and membership writes.

use crate::domain::{EventId, UserId};
use serde::{Deserialize, Serialize};

/// A registered user and the events they belong to.
///
/// Authentication is out of scope; this is the plain record the store
/// exchanges with the engine for membership updates and picker listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub email: String,
    /// Ids of events this user is a member of.
    #[serde(default)]
    pub event_ids: Vec<EventId>,
}

impl UserProfile {
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        UserProfile {
            user_id,
            display_name: display_name.into(),
            email: email.into(),
            event_ids: Vec::new(),
        }
    }

    /// Record membership of an event, once.
    pub fn add_membership(&mut self, event_id: EventId) {
        if !self.event_ids.contains(&event_id) {
            self.event_ids.push(event_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_membership_dedupes() {
        let mut profile = UserProfile::new(UserId::new("alice"), "Alice", "alice@example.com");
        let event = EventId::new("e1");
        profile.add_membership(event.clone());
        profile.add_membership(event);
        assert_eq!(profile.event_ids.len(), 1);
    }
}
