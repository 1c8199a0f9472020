use chrono::{Duration, Utc};
use uuid::Uuid;

use boxoffice_domain::reservation::ReservationStatus;
use boxoffice_domain::seat::SeatStatus;

use boxoffice_reservations::domain::types::SWEEP_LOCK_KEY;
use boxoffice_reservations::usecase::expire::SweepReservationsUseCase;

use crate::helpers::{
    InMemoryStore, MockLock, on_sale_session, seed_pending_reservation, seed_session,
};

#[tokio::test]
async fn should_expire_due_reservations_and_release_seats() {
    let store = InMemoryStore::default();
    let session = on_sale_session();
    let seat_ids = seed_session(&store, &session, 16);
    let reservation = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[0],
        Uuid::new_v4(),
        Utc::now() - Duration::seconds(1),
    );

    let report = SweepReservationsUseCase {
        lock: MockLock::free(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert!(!report.skipped);
    assert_eq!(report.expired, 1);
    assert_eq!(report.released, 1);
    assert_eq!(report.failed, 0);

    let state = store.handle();
    let state = state.lock().unwrap();
    assert_eq!(
        state.reservations[&reservation.id].status,
        ReservationStatus::Expired
    );
    assert_eq!(state.seats[&seat_ids[0]].status, SeatStatus::Available);
    let row = &state.expiration_outbox[0];
    assert_eq!(row.reservation_id, reservation.id);
    assert!(row.seat_released);
}

#[tokio::test]
async fn should_leave_unexpired_reservations_alone() {
    let store = InMemoryStore::default();
    let session = on_sale_session();
    let seat_ids = seed_session(&store, &session, 16);
    let reservation = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[0],
        Uuid::new_v4(),
        Utc::now() + Duration::seconds(30),
    );

    let report = SweepReservationsUseCase {
        lock: MockLock::free(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.expired, 0);
    let state = store.handle();
    let state = state.lock().unwrap();
    assert_eq!(
        state.reservations[&reservation.id].status,
        ReservationStatus::Pending
    );
}

#[tokio::test]
async fn should_not_release_seat_already_sold() {
    let store = InMemoryStore::default();
    let session = on_sale_session();
    let seat_ids = seed_session(&store, &session, 16);
    let reservation = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[0],
        Uuid::new_v4(),
        Utc::now() - Duration::seconds(1),
    );

    // A sale slipped in between the due-scan and this row's turn: the seat is
    // already sold even though the reservation row is still pending.
    {
        let state = store.handle();
        let mut state = state.lock().unwrap();
        state.seats.get_mut(&seat_ids[0]).unwrap().status = SeatStatus::Sold;
    }

    let report = SweepReservationsUseCase {
        lock: MockLock::free(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.expired, 1);
    assert_eq!(report.released, 0, "a sold seat stays sold");

    let state = store.handle();
    let state = state.lock().unwrap();
    assert_eq!(state.seats[&seat_ids[0]].status, SeatStatus::Sold);
    assert_eq!(
        state.reservations[&reservation.id].status,
        ReservationStatus::Expired
    );
    assert!(!state.expiration_outbox[0].seat_released);
}

#[tokio::test]
async fn should_skip_tick_when_lock_held_elsewhere() {
    let store = InMemoryStore::default();
    let session = on_sale_session();
    let seat_ids = seed_session(&store, &session, 16);
    let reservation = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[0],
        Uuid::new_v4(),
        Utc::now() - Duration::seconds(1),
    );

    let lock = MockLock::held_elsewhere();
    let report = SweepReservationsUseCase {
        lock: lock.clone(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert!(report.skipped);
    assert!(lock.released.lock().unwrap().is_empty());
    let state = store.handle();
    let state = state.lock().unwrap();
    assert_eq!(
        state.reservations[&reservation.id].status,
        ReservationStatus::Pending,
        "a losing instance must not touch anything"
    );
}

#[tokio::test]
async fn should_release_lock_after_sweeping() {
    let store = InMemoryStore::default();
    let lock = MockLock::free();
    SweepReservationsUseCase {
        lock: lock.clone(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(
        lock.released.lock().unwrap().as_slice(),
        [SWEEP_LOCK_KEY.to_owned()]
    );
}

#[tokio::test]
async fn should_continue_sweep_past_failing_rows() {
    let store = InMemoryStore::default();
    let session = on_sale_session();
    let seat_ids = seed_session(&store, &session, 16);
    let poisoned = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[0],
        Uuid::new_v4(),
        Utc::now() - Duration::seconds(2),
    );
    let healthy = seed_pending_reservation(
        &store,
        session.id,
        seat_ids[1],
        Uuid::new_v4(),
        Utc::now() - Duration::seconds(1),
    );
    {
        let state = store.handle();
        let mut state = state.lock().unwrap();
        state.fail_expire_for.insert(poisoned.id);
    }

    let report = SweepReservationsUseCase {
        lock: MockLock::free(),
        reservations: store.clone(),
    }
    .execute()
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.expired, 1);

    let state = store.handle();
    let state = state.lock().unwrap();
    assert_eq!(
        state.reservations[&healthy.id].status,
        ReservationStatus::Expired,
        "one bad row must not block the rest"
    );
    assert_eq!(
        state.reservations[&poisoned.id].status,
        ReservationStatus::Pending
    );
}
