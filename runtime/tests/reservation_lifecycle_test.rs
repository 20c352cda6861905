//! Reservation lifecycle tests on a paused clock.
//!
//! Every test runs with tokio's time paused, so a one-minute booking expires
//! as soon as the test sleeps past it, with no real waiting.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reseasy_core::{
    AuditAction, BookingOutcome, BookingRequest, Money, ReservationError, SlotNumber, Tier,
};
use reseasy_runtime::ReservationEngine;
use reseasy_testing::{FailingAuditLog, RecordingAuditLog, party, test_clock};
use std::sync::Arc;
use std::time::Duration;

fn table(n: u32) -> SlotNumber {
    SlotNumber::new(n)
}

fn engine_with_audit() -> (ReservationEngine, Arc<RecordingAuditLog>) {
    let audit = Arc::new(RecordingAuditLog::new());
    let engine = ReservationEngine::builder()
        .clock(Arc::new(test_clock()))
        .audit_log(audit.clone())
        .build()
        .unwrap();
    (engine, audit)
}

fn seated_at(outcome: BookingOutcome) -> SlotNumber {
    match outcome {
        BookingOutcome::Seated { slot } => slot,
        BookingOutcome::Queued { .. } => panic!("expected to be seated, got {outcome:?}"),
    }
}

/// Seat a party at every table of the standard layout.
fn fill_standard_floor(engine: &ReservationEngine, minutes: u64) {
    for (name, size) in [("T1", 2), ("T2", 4), ("T3", 6), ("T4", 6), ("T5", 8)] {
        seated_at(engine.book(party(name, size, minutes)).unwrap());
    }
}

#[tokio::test(start_paused = true)]
async fn test_booking_auto_releases_and_collects() {
    let (engine, audit) = engine_with_audit();

    let slot = seated_at(
        engine
            .book(BookingRequest::minutes("Ravi", 2, 1, Money::from_major(100)))
            .unwrap(),
    );
    assert_eq!(slot, table(1));
    assert_eq!(engine.total_revenue(), Money::ZERO);

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert!(engine.slot(slot).unwrap().is_free());
    assert_eq!(engine.total_revenue(), Money::from_major(200));
    let actions = audit.actions_for(slot);
    assert_eq!(actions.len(), 2);
    assert!(matches!(actions[0], AuditAction::Booked { party_size: 2, .. }));
    assert_eq!(
        actions[1],
        AuditAction::AutoReleased { collected: Money::from_major(200) }
    );
}

#[tokio::test(start_paused = true)]
async fn test_force_release_promotes_queued_party() {
    let audit = Arc::new(RecordingAuditLog::new());
    let engine = ReservationEngine::builder()
        .tables([
            (table(1), Tier::new(2)),
            (table(2), Tier::new(4)),
            (table(3), Tier::new(6)),
            (table(4), Tier::new(8)),
        ])
        .audit_log(audit.clone())
        .build()
        .unwrap();

    assert_eq!(seated_at(engine.book(party("First", 5, 60)).unwrap()), table(3));
    assert_eq!(
        engine.book(party("Second", 6, 60)).unwrap(),
        BookingOutcome::Queued { position: 1, tier: Tier::new(6) }
    );

    let collected = engine.force_release(table(3)).unwrap();
    assert_eq!(collected, Money::from_major(500));
    assert_eq!(engine.total_revenue(), Money::from_major(500));

    let occupant = engine.slot(table(3)).unwrap().occupant.unwrap();
    assert_eq!(occupant.name, "Second");
    assert_eq!(occupant.party_size, 6);
    assert!(engine.waiting_list().is_empty());

    let actions = audit.actions_for(table(3));
    assert_eq!(
        actions[1],
        AuditAction::ForceReleased { collected: Money::from_major(500) }
    );
    assert!(matches!(&actions[2], AuditAction::Booked { name, .. } if name == "Second"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_expiry_collects_nothing() {
    let (engine, audit) = engine_with_audit();

    let slot = seated_at(engine.book(party("Ira", 4, 1)).unwrap());
    tokio::time::sleep(Duration::from_secs(20)).await;
    engine.cancel(slot).unwrap();

    assert!(engine.slot(slot).unwrap().is_free());
    assert_eq!(engine.time_remaining(slot).unwrap(), Duration::ZERO);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(engine.total_revenue(), Money::ZERO);
    assert_eq!(audit.actions_for(slot).last(), Some(&AuditAction::Cancelled));

    // The freed table is the next one handed out for its tier.
    assert_eq!(seated_at(engine.book(party("Next", 3, 5)).unwrap()), slot);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_timer_never_fires_on_next_occupant() {
    let (engine, _audit) = engine_with_audit();

    let slot = seated_at(engine.book(party("Early", 2, 1)).unwrap());
    tokio::time::sleep(Duration::from_secs(30)).await;
    engine.cancel(slot).unwrap();
    assert_eq!(seated_at(engine.book(party("Late", 2, 1)).unwrap()), slot);

    // The first session would have expired at 60s.
    tokio::time::sleep(Duration::from_secs(31)).await;
    let occupant = engine.slot(slot).unwrap().occupant.unwrap();
    assert_eq!(occupant.name, "Late");
    assert_eq!(engine.total_revenue(), Money::ZERO);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(engine.slot(slot).unwrap().is_free());
    assert_eq!(engine.total_revenue(), Money::from_major(200));
}

#[tokio::test(start_paused = true)]
async fn test_only_queue_head_is_promoted() {
    let (engine, _audit) = engine_with_audit();
    fill_standard_floor(&engine, 60);

    // A needs a 4-seater, B a 2-seater.
    assert!(matches!(
        engine.book(party("A", 3, 30)).unwrap(),
        BookingOutcome::Queued { position: 1, .. }
    ));
    assert!(matches!(
        engine.book(party("B", 2, 30)).unwrap(),
        BookingOutcome::Queued { position: 2, .. }
    ));

    // A 2-seater frees up, but A is at the head and needs a 4-seater.
    engine.cancel(table(1)).unwrap();
    assert!(engine.slot(table(1)).unwrap().is_free());
    let names: Vec<String> = engine
        .waiting_list()
        .into_iter()
        .map(|w| w.request.name)
        .collect();
    assert_eq!(names, vec!["A", "B"]);

    // The 4-seater frees up: A is seated, B is now the head.
    engine.cancel(table(2)).unwrap();
    assert_eq!(engine.slot(table(2)).unwrap().occupant.unwrap().name, "A");
    assert_eq!(engine.waiting_list().len(), 1);

    // B fits the idle 2-seater on the next promotion attempt.
    assert_eq!(engine.promote_waiting(), Some(table(1)));
    assert!(engine.waiting_list().is_empty());
    assert_eq!(engine.promote_waiting(), None);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_promotes_waiting_party() {
    let (engine, _audit) = engine_with_audit();

    seated_at(engine.book(party("Now", 2, 1)).unwrap());
    assert!(matches!(
        engine.book(party("Later", 1, 1)).unwrap(),
        BookingOutcome::Queued { position: 1, tier } if tier == Tier::new(2)
    ));

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(engine.slot(table(1)).unwrap().occupant.unwrap().name, "Later");
    assert!(engine.waiting_list().is_empty());
    assert_eq!(engine.total_revenue(), Money::from_major(200));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(engine.slot(table(1)).unwrap().is_free());
    assert_eq!(engine.total_revenue(), Money::from_major(300));
}

#[tokio::test(start_paused = true)]
async fn test_oversized_party_takes_largest_table() {
    let (engine, _audit) = engine_with_audit();
    assert_eq!(engine.required_tier(12), Tier::new(8));
    assert_eq!(seated_at(engine.book(party("Wedding", 12, 90)).unwrap()), table(5));
}

#[tokio::test(start_paused = true)]
async fn test_time_remaining_counts_down() {
    let (engine, _audit) = engine_with_audit();
    let slot = seated_at(engine.book(party("Sam", 2, 2)).unwrap());

    let mut previous = engine.time_remaining(slot).unwrap();
    assert_eq!(previous, Duration::from_secs(120));
    for _ in 0..4 {
        tokio::time::sleep(Duration::from_secs(25)).await;
        let remaining = engine.time_remaining(slot).unwrap();
        assert!(remaining <= previous);
        previous = remaining;
    }
    assert_eq!(previous, Duration::from_secs(20));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.time_remaining(slot).unwrap(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_operations_on_unknown_or_free_tables() {
    let (engine, _audit) = engine_with_audit();

    assert_eq!(engine.cancel(table(42)), Err(ReservationError::NotFound(table(42))));
    assert_eq!(
        engine.force_release(table(42)),
        Err(ReservationError::NotFound(table(42)))
    );
    assert_eq!(engine.cancel(table(1)), Err(ReservationError::NotOccupied(table(1))));
    assert_eq!(
        engine.force_release(table(1)),
        Err(ReservationError::NotOccupied(table(1)))
    );
    assert!(engine.time_remaining(table(42)).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_bookings_are_rejected() {
    let (engine, audit) = engine_with_audit();

    let invalid = [
        party("", 2, 10),
        party("Zero", 0, 10),
        party("NoTime", 2, 0),
        BookingRequest::minutes("Free", 2, 10, Money::ZERO),
    ];
    for request in invalid {
        assert!(matches!(
            engine.book(request),
            Err(ReservationError::InvalidArgument { .. })
        ));
    }
    assert!(audit.is_empty());
    assert!(engine.slot_status().iter().all(|s| s.is_free()));
    assert!(engine.waiting_list().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_audit_failure_does_not_fail_booking() {
    let audit = Arc::new(FailingAuditLog::new());
    let engine = ReservationEngine::builder()
        .audit_log(audit.clone())
        .build()
        .unwrap();

    let slot = seated_at(engine.book(party("Resilient", 2, 1)).unwrap());
    assert_eq!(engine.force_release(slot).unwrap(), Money::from_major(200));
    assert_eq!(audit.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_shared_ledger_and_shutdown() {
    let ledger = Arc::new(reseasy_runtime::RevenueLedger::new());
    let engine = ReservationEngine::builder()
        .ledger(Arc::clone(&ledger))
        .build()
        .unwrap();

    let slot = seated_at(engine.book(party("Shared", 2, 1)).unwrap());
    engine.force_release(slot).unwrap();
    assert_eq!(ledger.total(), Money::from_major(200));

    fill_standard_floor(&engine, 1);
    assert_eq!(engine.shutdown(), 5);

    // Timers were stopped: nothing more is collected.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(ledger.total(), Money::from_major(200));
    assert!(engine.slot_status().iter().all(|s| s.is_free()));
}
