use splitpot::domain::{Bill, BillId, EventId, EventParticipant, ShareType};
use splitpot::engine::{compute_balances, equal_share, format_share, BillDraft};
use splitpot::{BillParticipant, Currency, Decimal, UserId};

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn roster(ids: &[&str]) -> Vec<EventParticipant> {
    ids.iter()
        .map(|id| EventParticipant::pending(UserId::new(*id), *id))
        .collect()
}

fn now() -> chrono::DateTime<chrono::Utc> {
    "2026-01-01T12:00:00Z".parse().unwrap()
}

/// Build a bill the way the submission path does: draft, selection, then
/// final assembly with the creator folded in.
fn submit_bill(creator: &str, title: &str, value: &str, others: &[(&str, bool)]) -> Bill {
    let mut draft = BillDraft::new(Currency::new("PLN")).with_title(title);
    for (id, _) in others {
        draft = draft.add_participant(UserId::new(*id), *id);
    }
    for (id, has_paid) in others {
        if *has_paid {
            draft = draft.toggle_paid(&UserId::new(*id));
        }
    }
    let draft = draft.set_value(d(value));
    draft
        .build(d(value), EventId::new("e1"), UserId::new(creator), creator, now())
        .unwrap()
}

#[test]
fn empty_history_gives_zero_for_every_roster_member() {
    let balances = compute_balances(&roster(&["alice", "bob"]), &[]);

    assert_eq!(balances.len(), 2);
    assert_eq!(balances[&UserId::new("alice")], Decimal::zero());
    assert_eq!(balances[&UserId::new("bob")], Decimal::zero());
}

#[test]
fn dinner_bill_with_unpaid_participant() {
    // Alice creates "Dinner", 100, split with Bob (unpaid).
    let bill = submit_bill("alice", "Dinner", "100", &[("bob", false)]);

    let bob = bill
        .participants
        .iter()
        .find(|p| p.user_id == UserId::new("bob"))
        .unwrap();
    let alice = bill.creator().unwrap();
    assert_eq!(bob.share, d("50"));
    assert_eq!(alice.share, d("-50"));

    let balances = compute_balances(&roster(&["alice", "bob"]), &[bill]);
    // Creator formula applied literally: 100 - (-50.0) - 0 = 150.0.
    assert_eq!(balances[&UserId::new("alice")], d("150"));
    assert_eq!(balances[&UserId::new("bob")], d("50"));
}

#[test]
fn dinner_bill_after_bob_settles() {
    // Same bill as above, but Bob marked as paid before submission.
    let bill = submit_bill("alice", "Dinner", "100", &[("bob", true)]);

    let bob = bill
        .participants
        .iter()
        .find(|p| p.user_id == UserId::new("bob"))
        .unwrap();
    assert!(bob.has_paid);
    assert_eq!(bob.share, d("-50"));

    let balances = compute_balances(&roster(&["alice", "bob"]), &[bill]);
    // paid_by_others is the signed sum (-50.0), so the creator's delta is
    // 100 - (-50.0) - (-50.0) = 200.0; Bob's settled share contributes 0.
    assert_eq!(balances[&UserId::new("alice")], d("200"));
    assert_eq!(balances[&UserId::new("bob")], Decimal::zero());
}

#[test]
fn three_way_split_keeps_rounding_leakage() {
    // 10 over 3 participants rounds each share to 3.3; the 0.1
    // is leaked, not reconstructed.
    let bill = submit_bill("alice", "Taxi", "10", &[("bob", false), ("carol", false)]);

    let abs_sum = bill
        .participants
        .iter()
        .fold(Decimal::zero(), |acc, p| acc + p.share.abs());
    assert_eq!(abs_sum, d("9.9"));
}

#[test]
fn share_sum_tracks_value_within_tolerance() {
    // The sum of absolute shares stays within N * 0.05 of the total.
    for (value, selected) in [("100", 1usize), ("77.7", 3), ("10", 2), ("0.5", 5)] {
        let n = selected + 1;
        let per = format_share(equal_share(d(value), n), false);
        let mut sum = Decimal::zero();
        for _ in 0..n {
            sum = sum + per.abs();
        }
        let tolerance = d("0.05") * Decimal::from_i64(n as i64);
        assert!(
            (sum - d(value)).abs() <= tolerance,
            "value {} with {} participants drifted: {}",
            value,
            n,
            sum
        );
    }
}

#[test]
fn share_sign_tracks_payment_status() {
    // share > 0 iff unpaid, share <= 0 iff paid, on a built bill.
    let bill = submit_bill(
        "alice",
        "Hotel",
        "300",
        &[("bob", false), ("carol", true), ("dave", false)],
    );

    for p in &bill.participants {
        if p.has_paid {
            assert!(
                !p.share.is_positive(),
                "{} is settled but share is positive",
                p.user_id
            );
        } else {
            assert!(
                p.share.is_positive(),
                "{} owes but share is not positive",
                p.user_id
            );
        }
    }
}

#[test]
fn balance_keys_match_roster_for_any_history() {
    // Output keys are exactly the roster, with off-roster bill
    // participants dropped and bill-less members at zero.
    let bill = submit_bill("alice", "Dinner", "60", &[("ghost", false)]);
    let balances = compute_balances(&roster(&["alice", "bob"]), &[bill]);

    let keys: Vec<&str> = balances.keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, vec!["alice", "bob"]);
    assert_eq!(balances[&UserId::new("bob")], Decimal::zero());
}

#[test]
fn built_bill_has_exactly_one_creator() {
    // Exactly one creator entry, including the creator-also-selected case.
    let plain = submit_bill("alice", "Dinner", "100", &[("bob", false)]);
    assert_eq!(plain.participants.iter().filter(|p| p.creator).count(), 1);

    let mut draft = BillDraft::new(Currency::new("PLN")).with_title("Dinner");
    draft = draft.add_participant(UserId::new("alice"), "alice");
    draft = draft.add_participant(UserId::new("bob"), "bob");
    let draft = draft.set_value(d("100"));
    let promoted = draft
        .build(d("100"), EventId::new("e1"), UserId::new("alice"), "alice", now())
        .unwrap();

    assert_eq!(promoted.participants.len(), 2);
    assert_eq!(promoted.participants.iter().filter(|p| p.creator).count(), 1);
    let creator = promoted.creator().unwrap();
    assert!(creator.has_paid);
}

#[test]
fn creator_entry_is_always_settled() {
    // The creator paid the bill up front, so their entry is settled with a
    // negative share by construction.
    let bill = submit_bill("alice", "Dinner", "100", &[("bob", false), ("carol", true)]);
    let creator = bill.creator().unwrap();
    assert!(creator.has_paid);
    assert!(creator.share.is_negative());
    assert_eq!(creator.share_type, ShareType::Equal);
}

#[test]
fn mixed_history_accumulates_per_member() {
    let bills = vec![
        submit_bill("alice", "Dinner", "100", &[("bob", false)]),
        submit_bill("bob", "Taxi", "30", &[("alice", false)]),
        submit_bill("alice", "Museum", "45", &[("bob", true)]),
    ];
    let balances = compute_balances(&roster(&["alice", "bob"]), &bills);

    // Dinner: alice +150, bob +50. Taxi: bob +45, alice +15.
    // Museum (bob settled 22.5): alice += 45 - (-22.5) - (-22.5) = 90.
    assert_eq!(balances[&UserId::new("alice")], d("255"));
    assert_eq!(balances[&UserId::new("bob")], d("95"));
}

#[test]
fn manual_bill_with_off_convention_shares_still_sums_literally() {
    // The engine applies stored shares as-is; it never re-derives them.
    let bill = Bill {
        id: BillId::new("b1"),
        title: "Manual".to_string(),
        value: d("80"),
        creator_id: UserId::new("alice"),
        event_id: EventId::new("e1"),
        participants: vec![
            BillParticipant {
                user_id: UserId::new("alice"),
                display_name: "alice".to_string(),
                has_paid: true,
                share: d("-40"),
                share_type: ShareType::Equal,
                creator: true,
            },
            BillParticipant {
                user_id: UserId::new("bob"),
                display_name: "bob".to_string(),
                has_paid: false,
                share: d("40"),
                share_type: ShareType::Equal,
                creator: false,
            },
        ],
        created_at: now(),
    };

    let balances = compute_balances(&roster(&["alice", "bob"]), &[bill]);
    assert_eq!(balances[&UserId::new("alice")], d("120"));
    assert_eq!(balances[&UserId::new("bob")], d("40"));
}
