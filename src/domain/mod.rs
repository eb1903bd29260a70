//! Domain model: money, identifiers, events, bills, and user profiles.

pub mod bill;
pub mod decimal;
pub mod event;
pub mod primitives;
pub mod user;

pub use bill::{Bill, BillParticipant, ShareType};
pub use decimal::Decimal;
pub use event::{Event, EventParticipant};
pub use primitives::{BillId, Currency, EventId, UserId};
pub use user::UserProfile;
