//! Pure computation engine for share allocation and balance settlement.

pub mod balance;
pub mod bill_builder;
pub mod share;

pub use balance::compute_balances;
pub use bill_builder::{BillDraft, ValidationError};
pub use share::{equal_share, format_share, recompute_shares};
