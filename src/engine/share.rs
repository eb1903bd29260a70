//! Share allocation for a bill: equal split plus the payment-direction sign.

use crate::domain::{BillParticipant, Decimal};

/// Raw per-participant share of a bill total.
///
/// `participant_count` must already include the implicit creator (selected
/// non-creator participants + 1). A zero count yields zero rather than an
/// error; the creator always counts as one, so it cannot occur in practice.
pub fn equal_share(total_value: Decimal, participant_count: usize) -> Decimal {
    if participant_count > 0 {
        total_value / Decimal::from_i64(participant_count as i64)
    } else {
        Decimal::zero()
    }
}

/// Apply the share rounding and sign policy.
///
/// The magnitude is `abs(raw)` rounded to one decimal place (midpoints away
/// from zero). Sign: positive while the participant still owes their share
/// (`has_paid = false`), negative once settled (`has_paid = true`). The
/// balance engine sums creator and participant deltas with the same `+=`, so
/// flipping this convention corrupts every computed balance.
pub fn format_share(raw_share: Decimal, has_paid: bool) -> Decimal {
    let magnitude = raw_share.abs().round_1dp();
    if has_paid {
        -magnitude
    } else {
        magnitude
    }
}

/// Recompute every selected participant's share for a new total.
///
/// Each share depends on the participant count, so any change to the total,
/// the selection, or a paid flag invalidates all of them, not just the one
/// that changed. Returns a new list; the input is untouched.
pub fn recompute_shares(
    total_value: Decimal,
    participants: &[BillParticipant],
) -> Vec<BillParticipant> {
    // +1 for the implicit creator.
    let per_participant = equal_share(total_value, participants.len() + 1);
    participants
        .iter()
        .map(|p| BillParticipant {
            share: format_share(per_participant, p.has_paid),
            ..p.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    fn selected(id: &str) -> BillParticipant {
        BillParticipant::selected(UserId::new(id), id)
    }

    #[test]
    fn test_equal_share_divides_by_count() {
        assert_eq!(equal_share(d("100"), 2), d("50"));
        assert_eq!(equal_share(d("100"), 4), d("25"));
    }

    #[test]
    fn test_equal_share_zero_count_yields_zero() {
        assert_eq!(equal_share(d("100"), 0), Decimal::zero());
    }

    #[test]
    fn test_format_share_sign_follows_has_paid() {
        // Unpaid participants owe their share: positive.
        assert_eq!(format_share(d("50"), false), d("50"));
        // Settled participants net against the creator: negative.
        assert_eq!(format_share(d("50"), true), d("-50"));
        // Magnitude is taken from the absolute value.
        assert_eq!(format_share(d("-50"), false), d("50"));
    }

    #[test]
    fn test_format_share_rounds_to_one_decimal() {
        // 10 / 3 = 3.333... -> 3.3, not 3.33.
        assert_eq!(format_share(equal_share(d("10"), 3), false), d("3.3"));
        assert_eq!(format_share(equal_share(d("10"), 3), true), d("-3.3"));
    }

    #[test]
    fn test_recompute_shares_updates_every_entry() {
        let participants = vec![selected("bob"), selected("carol")];
        // 3 participants total including the creator.
        let shares = recompute_shares(d("90"), &participants);
        assert_eq!(shares.len(), 2);
        for p in &shares {
            assert_eq!(p.share, d("30"));
        }

        // Changing the selection changes everyone's share.
        let fewer = recompute_shares(d("90"), &shares[..1]);
        assert_eq!(fewer[0].share, d("45"));
    }

    #[test]
    fn test_recompute_shares_preserves_paid_sign() {
        let mut participants = vec![selected("bob"), selected("carol")];
        participants[1].has_paid = true;

        let shares = recompute_shares(d("90"), &participants);
        assert_eq!(shares[0].share, d("30"));
        assert_eq!(shares[1].share, d("-30"));
    }

    #[test]
    fn test_share_sum_stays_within_rounding_tolerance() {
        // Sum of absolute shares approximates the total within N * 0.05
        // (half the 1-decimal rounding unit per participant).
        let cases = [("10", 3usize), ("100", 7), ("0.1", 4), ("33.33", 6)];
        for (total, n) in cases {
            let total = d(total);
            let per = format_share(equal_share(total, n), false);
            let mut sum = Decimal::zero();
            for _ in 0..n {
                sum += per.abs();
            }
            let tolerance = d("0.05") * Decimal::from_i64(n as i64);
            assert!(
                (sum - total).abs() <= tolerance,
                "total {} over {} participants: sum {} drifts past {}",
                total,
                n,
                sum,
                tolerance
            );
        }
    }

    #[test]
    fn test_known_rounding_leakage_on_ten_by_three() {
        // 10 split three ways leaks 0.1: each share rounds to 3.3.
        let per = format_share(equal_share(d("10"), 3), false);
        let sum = per + per + per;
        assert_eq!(sum, d("9.9"));
    }
}
