//! Full-recompute balance engine over an event's bill history.

use crate::domain::{Bill, Decimal, EventParticipant, UserId};
use std::collections::BTreeMap;

/// Compute the authoritative net balance per roster member from scratch.
///
/// This is a full recompute, not an incremental ledger: every invocation
/// discards prior balances and rebuilds them from the complete bill history,
/// so a stale or partially persisted result self-corrects on the next run.
/// Cost is O(bills x participants-per-bill) per call.
///
/// The output map's keys are exactly the roster's user ids: a member with no
/// bills appears at zero, and a bill participant no longer on the roster is
/// silently ignored.
pub fn compute_balances(
    roster: &[EventParticipant],
    bills: &[Bill],
) -> BTreeMap<UserId, Decimal> {
    let mut balances: BTreeMap<UserId, Decimal> = roster
        .iter()
        .map(|p| (p.user_id.clone(), Decimal::zero()))
        .collect();

    for bill in bills {
        // Signed sum of shares the non-creator participants have already
        // settled. Shares carry their sign from format_share, so paid
        // entries are negative and this sum is <= 0; it is used as-is.
        let paid_by_others = bill
            .participants
            .iter()
            .filter(|p| !p.creator && p.has_paid)
            .fold(Decimal::zero(), |acc, p| acc + p.share);

        for participant in &bill.participants {
            let Some(balance) = balances.get_mut(&participant.user_id) else {
                // Off-roster participant; excluded from the output map.
                continue;
            };

            if participant.creator {
                // The creator advanced the full bill value and is owed it
                // back, less their own share and what others already paid.
                let delta = (bill.value - participant.share - paid_by_others).round_1dp();
                *balance += delta;
            } else if !participant.has_paid {
                *balance += participant.share.round_1dp();
            }
            // Settled non-creator shares net to zero for this bill.
        }
    }

    for balance in balances.values_mut() {
        *balance = balance.round_2dp();
    }

    balances
}
