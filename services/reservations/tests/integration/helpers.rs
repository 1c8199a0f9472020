use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use boxoffice_domain::pagination::PageRequest;
use boxoffice_domain::reservation::ReservationStatus;
use boxoffice_domain::seat::SeatStatus;
use boxoffice_domain::session::SessionStatus;

use boxoffice_reservations::domain::repository::{
    DistributedLock, ExpirationOutboxRepository, IdempotencyStore, MessageChannel,
    OutboxRepository, ReservationRepository, SaleRepository, SeatRepository, SessionProvider,
};
use boxoffice_reservations::domain::types::{
    EVENT_PAYMENT_CONFIRMED, EVENT_RESERVATION_CREATED, EVENT_SEAT_RELEASED, EventSession,
    ExpirationOutboxEvent, ExpireOutcome, OutboxEvent, Reservation, ReservationBatch, Sale, Seat,
    StoredResponse,
};
use boxoffice_reservations::error::ReservationsServiceError;

// ── In-memory store ──────────────────────────────────────────────────────────
//
// One mutex over the whole state plays the role of the database's transaction
// scope: every repository method is atomic, and "all or nothing" batches
// check everything before mutating anything.

#[derive(Default)]
pub struct StoreState {
    pub sessions: HashMap<Uuid, EventSession>,
    pub seats: HashMap<Uuid, Seat>,
    pub reservations: HashMap<Uuid, Reservation>,
    pub sales: Vec<Sale>,
    pub outbox: Vec<OutboxEvent>,
    pub expiration_outbox: Vec<ExpirationOutboxEvent>,
    /// Reservation ids whose expire_one should fail (sweep isolation tests).
    pub fail_expire_for: HashSet<Uuid>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub fn handle(&self) -> Arc<Mutex<StoreState>> {
        Arc::clone(&self.state)
    }
}

fn new_outbox_event(kind: &str, payload: serde_json::Value, now: DateTime<Utc>) -> OutboxEvent {
    OutboxEvent {
        id: Uuid::new_v4(),
        kind: kind.to_owned(),
        payload,
        attempts: 0,
        last_error: None,
        created_at: now,
        next_attempt_at: None,
        processed_at: None,
        failed_at: None,
    }
}

impl SessionProvider for InMemoryStore {
    async fn get_session(
        &self,
        id: Uuid,
    ) -> Result<Option<EventSession>, ReservationsServiceError> {
        Ok(self.state.lock().unwrap().sessions.get(&id).cloned())
    }
}

impl SeatRepository for InMemoryStore {
    async fn count_in_session(&self, session_id: Uuid) -> Result<u64, ReservationsServiceError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .seats
            .values()
            .filter(|s| s.session_id == session_id)
            .count() as u64)
    }

    async fn list_in_session(
        &self,
        session_id: Uuid,
        status: Option<SeatStatus>,
        page: PageRequest,
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        let state = self.state.lock().unwrap();
        let mut seats: Vec<Seat> = state
            .seats
            .values()
            .filter(|s| s.session_id == session_id)
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(seats
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Seat>, ReservationsServiceError> {
        Ok(self.state.lock().unwrap().seats.get(&id).cloned())
    }

    async fn provision(
        &self,
        session_id: Uuid,
        labels: &[String],
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        let taken: HashSet<String> = state
            .seats
            .values()
            .filter(|s| s.session_id == session_id)
            .map(|s| s.label.clone())
            .collect();
        let mut fresh = HashSet::new();
        for label in labels {
            if taken.contains(label) || !fresh.insert(label.clone()) {
                return Err(ReservationsServiceError::DuplicateSeatLabel);
            }
        }
        let now = Utc::now();
        let mut created = Vec::with_capacity(labels.len());
        for label in labels {
            let seat = Seat {
                id: Uuid::new_v4(),
                session_id,
                label: label.clone(),
                status: SeatStatus::Available,
                version: 0,
                created_at: now,
                updated_at: now,
            };
            state.seats.insert(seat.id, seat.clone());
            created.push(seat);
        }
        Ok(created)
    }

    async fn transition(
        &self,
        seat_id: Uuid,
        from: SeatStatus,
        to: SeatStatus,
    ) -> Result<bool, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        match state.seats.get_mut(&seat_id) {
            Some(seat) if seat.status == from => {
                seat.status = to;
                seat.version += 1;
                seat.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

impl ReservationRepository for InMemoryStore {
    async fn reserve_seats(
        &self,
        batch: &ReservationBatch,
    ) -> Result<Vec<Reservation>, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();

        // Check every seat before touching any — the mutex stands in for the
        // transaction rollback.
        for seat_id in &batch.seat_ids {
            match state.seats.get(seat_id) {
                Some(seat)
                    if seat.session_id == batch.session_id
                        && seat.status == SeatStatus::Available => {}
                _ => return Err(ReservationsServiceError::SeatConflict(*seat_id)),
            }
            let pending_exists = state.reservations.values().any(|r| {
                r.seat_id == *seat_id
                    && r.session_id == batch.session_id
                    && r.status == ReservationStatus::Pending
            });
            if pending_exists {
                return Err(ReservationsServiceError::SeatConflict(*seat_id));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(batch.seat_ids.len());
        for seat_id in &batch.seat_ids {
            let seat = state.seats.get_mut(seat_id).unwrap();
            seat.status = SeatStatus::Reserved;
            seat.version += 1;
            seat.updated_at = now;

            let reservation = Reservation {
                id: Uuid::new_v4(),
                session_id: batch.session_id,
                seat_id: *seat_id,
                user_id: batch.user_id,
                status: ReservationStatus::Pending,
                expires_at: batch.expires_at,
                created_at: now,
                updated_at: now,
            };
            state.reservations.insert(reservation.id, reservation.clone());

            let payload = serde_json::json!({
                "reservationId": reservation.id,
                "sessionId": reservation.session_id,
                "seatId": reservation.seat_id,
                "userId": reservation.user_id,
            });
            let event = new_outbox_event(EVENT_RESERVATION_CREATED, payload, now);
            state.outbox.push(event);
            created.push(reservation);
        }
        Ok(created)
    }

    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Reservation>, ReservationsServiceError> {
        let state = self.state.lock().unwrap();
        let mut due: Vec<Reservation> = state
            .reservations
            .values()
            .filter(|r| r.is_due(now))
            .cloned()
            .collect();
        due.sort_by_key(|r| r.expires_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn expire_one(
        &self,
        reservation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ExpireOutcome>, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_expire_for.contains(&reservation_id) {
            return Err(ReservationsServiceError::Internal(anyhow::anyhow!(
                "injected expiry failure"
            )));
        }
        let Some(reservation) = state.reservations.get(&reservation_id).cloned() else {
            return Ok(None);
        };
        if reservation.status != ReservationStatus::Pending {
            return Ok(None);
        }

        state
            .reservations
            .get_mut(&reservation_id)
            .unwrap()
            .status = ReservationStatus::Expired;

        let seat_released = match state.seats.get_mut(&reservation.seat_id) {
            Some(seat) if seat.status == SeatStatus::Reserved => {
                seat.status = SeatStatus::Available;
                seat.version += 1;
                seat.updated_at = now;
                true
            }
            _ => false,
        };

        state.expiration_outbox.push(ExpirationOutboxEvent {
            id: Uuid::new_v4(),
            reservation_id,
            session_id: reservation.session_id,
            seat_id: reservation.seat_id,
            seat_released,
            attempts: 0,
            last_error: None,
            created_at: now,
            next_attempt_at: None,
            processed_at: None,
            failed_at: None,
        });

        Ok(Some(ExpireOutcome {
            reservation_id,
            seat_id: reservation.seat_id,
            seat_released,
        }))
    }

    async fn cancel(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        let reservation = state
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or(ReservationsServiceError::ReservationNotFound)?;
        reservation.ensure_cancellable(user_id)?;

        let now = Utc::now();
        state
            .reservations
            .get_mut(&reservation_id)
            .unwrap()
            .status = ReservationStatus::Cancelled;

        let released = match state.seats.get_mut(&reservation.seat_id) {
            Some(seat) if seat.status == SeatStatus::Reserved => {
                seat.status = SeatStatus::Available;
                seat.version += 1;
                seat.updated_at = now;
                true
            }
            _ => false,
        };
        if released {
            let payload = serde_json::json!({
                "seatId": reservation.seat_id,
                "sessionId": reservation.session_id,
            });
            let event = new_outbox_event(EVENT_SEAT_RELEASED, payload, now);
            state.outbox.push(event);
        }
        Ok(())
    }
}

impl SaleRepository for InMemoryStore {
    async fn confirm_sale(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Sale, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        let reservation = state
            .reservations
            .get(&reservation_id)
            .cloned()
            .ok_or(ReservationsServiceError::ReservationNotFound)?;
        reservation.ensure_confirmable(user_id, now)?;

        let seat = state
            .seats
            .get(&reservation.seat_id)
            .cloned()
            .ok_or_else(|| ReservationsServiceError::Internal(anyhow::anyhow!("seat missing")))?;
        if seat.status != SeatStatus::Reserved {
            return Err(ReservationsServiceError::SeatNotReserved);
        }

        let already_sold = state
            .sales
            .iter()
            .any(|s| s.seat_id == reservation.seat_id && s.session_id == reservation.session_id);
        if already_sold {
            return Err(ReservationsServiceError::SeatConflict(reservation.seat_id));
        }

        let price = state
            .sessions
            .get(&reservation.session_id)
            .map(|s| s.ticket_price)
            .ok_or_else(|| {
                ReservationsServiceError::Internal(anyhow::anyhow!("session missing"))
            })?;

        state
            .reservations
            .get_mut(&reservation_id)
            .unwrap()
            .status = ReservationStatus::Confirmed;
        let seat = state.seats.get_mut(&reservation.seat_id).unwrap();
        seat.status = SeatStatus::Sold;
        seat.version += 1;
        seat.updated_at = now;

        let sale = Sale {
            id: Uuid::new_v4(),
            reservation_id,
            session_id: reservation.session_id,
            seat_id: reservation.seat_id,
            user_id: reservation.user_id,
            amount: price,
            created_at: now,
        };
        state.sales.push(sale.clone());

        let payload = serde_json::json!({
            "saleId": sale.id,
            "reservationId": sale.reservation_id,
            "amount": sale.amount,
        });
        let event = new_outbox_event(EVENT_PAYMENT_CONFIRMED, payload, now);
        state.outbox.push(event);

        Ok(sale)
    }
}

impl OutboxRepository for InMemoryStore {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, ReservationsServiceError> {
        let state = self.state.lock().unwrap();
        let mut due: Vec<OutboxEvent> = state
            .outbox
            .iter()
            .filter(|e| e.processed_at.is_none() && e.failed_at.is_none())
            .filter(|e| e.next_attempt_at.is_none_or(|at| at <= now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.created_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(event) = state.outbox.iter_mut().find(|e| e.id == id) {
            event.processed_at = Some(now);
        }
        Ok(())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(event) = state.outbox.iter_mut().find(|e| e.id == id) {
            event.attempts = attempts;
            event.last_error = Some(error.to_owned());
            event.next_attempt_at = next_attempt_at;
            if next_attempt_at.is_none() {
                event.failed_at = Some(now);
            }
        }
        Ok(())
    }

    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        let before = state.outbox.len();
        state
            .outbox
            .retain(|e| !e.processed_at.is_some_and(|at| at < cutoff));
        Ok((before - state.outbox.len()) as u64)
    }
}

impl ExpirationOutboxRepository for InMemoryStore {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<ExpirationOutboxEvent>, ReservationsServiceError> {
        let state = self.state.lock().unwrap();
        let mut due: Vec<ExpirationOutboxEvent> = state
            .expiration_outbox
            .iter()
            .filter(|e| e.processed_at.is_none() && e.failed_at.is_none())
            .filter(|e| e.next_attempt_at.is_none_or(|at| at <= now))
            .cloned()
            .collect();
        due.sort_by_key(|e| e.created_at);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(event) = state.expiration_outbox.iter_mut().find(|e| e.id == id) {
            event.processed_at = Some(now);
        }
        Ok(())
    }

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        if let Some(event) = state.expiration_outbox.iter_mut().find(|e| e.id == id) {
            event.attempts = attempts;
            event.last_error = Some(error.to_owned());
            event.next_attempt_at = next_attempt_at;
            if next_attempt_at.is_none() {
                event.failed_at = Some(now);
            }
        }
        Ok(())
    }

    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError> {
        let mut state = self.state.lock().unwrap();
        let before = state.expiration_outbox.len();
        state
            .expiration_outbox
            .retain(|e| !e.processed_at.is_some_and(|at| at < cutoff));
        Ok((before - state.expiration_outbox.len()) as u64)
    }
}

// ── Mock lock ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MockLock {
    pub available: bool,
    pub acquired: Arc<Mutex<Vec<String>>>,
    pub released: Arc<Mutex<Vec<String>>>,
}

impl MockLock {
    pub fn free() -> Self {
        Self {
            available: true,
            acquired: Arc::new(Mutex::new(vec![])),
            released: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn held_elsewhere() -> Self {
        Self {
            available: false,
            acquired: Arc::new(Mutex::new(vec![])),
            released: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl DistributedLock for MockLock {
    async fn acquire(&self, key: &str, _ttl_secs: u64) -> Result<bool, ReservationsServiceError> {
        if !self.available {
            return Ok(false);
        }
        self.acquired.lock().unwrap().push(key.to_owned());
        Ok(true)
    }

    async fn release(&self, key: &str) -> Result<(), ReservationsServiceError> {
        self.released.lock().unwrap().push(key.to_owned());
        Ok(())
    }
}

// ── Recording channel ────────────────────────────────────────────────────────

/// Message channel that records publishes and can fail the first N attempts.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    pub published: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    pub failures_remaining: Arc<Mutex<u32>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(n: u32) -> Self {
        let channel = Self::default();
        *channel.failures_remaining.lock().unwrap() = n;
        channel
    }

    pub fn events(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }
}

impl MessageChannel for RecordingChannel {
    async fn publish(&self, event: &str, payload: &serde_json::Value) -> anyhow::Result<()> {
        {
            let mut failures = self.failures_remaining.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                anyhow::bail!("transient publish failure");
            }
        }
        self.published
            .lock()
            .unwrap()
            .push((event.to_owned(), payload.clone()));
        Ok(())
    }
}

// ── In-memory idempotency store ──────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryIdempotencyStore {
    pub leases: Arc<Mutex<HashSet<String>>>,
    pub responses: Arc<Mutex<HashMap<String, StoredResponse>>>,
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn begin(&self, key: &str, _lease_secs: u64) -> Result<bool, ReservationsServiceError> {
        Ok(self.leases.lock().unwrap().insert(key.to_owned()))
    }

    async fn find_response(
        &self,
        key: &str,
    ) -> Result<Option<StoredResponse>, ReservationsServiceError> {
        Ok(self.responses.lock().unwrap().get(key).cloned())
    }

    async fn store_response(
        &self,
        key: &str,
        response: &StoredResponse,
        _ttl_secs: u64,
    ) -> Result<(), ReservationsServiceError> {
        self.responses
            .lock()
            .unwrap()
            .insert(key.to_owned(), response.clone());
        Ok(())
    }

    async fn abandon(&self, key: &str) -> Result<(), ReservationsServiceError> {
        self.leases.lock().unwrap().remove(key);
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const TICKET_PRICE: i64 = 4500;

pub fn on_sale_session() -> EventSession {
    EventSession {
        id: Uuid::new_v4(),
        status: SessionStatus::OnSale,
        ticket_price: TICKET_PRICE,
        min_seats: 16,
    }
}

/// Seed a session with `seat_count` available seats; returns seat ids in
/// label order.
pub fn seed_session(store: &InMemoryStore, session: &EventSession, seat_count: usize) -> Vec<Uuid> {
    let mut state = store.state.lock().unwrap();
    state.sessions.insert(session.id, session.clone());
    let now = Utc::now();
    let mut seat_ids = Vec::with_capacity(seat_count);
    for n in 0..seat_count {
        let seat = Seat {
            id: Uuid::new_v4(),
            session_id: session.id,
            label: format!("A-{:02}", n + 1),
            status: SeatStatus::Available,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        seat_ids.push(seat.id);
        state.seats.insert(seat.id, seat);
    }
    seat_ids
}

/// Insert a pending reservation directly (seat flips to reserved).
pub fn seed_pending_reservation(
    store: &InMemoryStore,
    session_id: Uuid,
    seat_id: Uuid,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
) -> Reservation {
    let mut state = store.state.lock().unwrap();
    let now = Utc::now();
    if let Some(seat) = state.seats.get_mut(&seat_id) {
        seat.status = SeatStatus::Reserved;
        seat.version += 1;
    }
    let reservation = Reservation {
        id: Uuid::new_v4(),
        session_id,
        seat_id,
        user_id,
        status: ReservationStatus::Pending,
        expires_at,
        created_at: now,
        updated_at: now,
    };
    state.reservations.insert(reservation.id, reservation.clone());
    reservation
}

/// Insert an expiration-flavor outbox row directly, for relay tests.
pub fn seed_expiration_event(store: &InMemoryStore, seat_released: bool, attempts: i32) -> Uuid {
    let mut state = store.state.lock().unwrap();
    let event = ExpirationOutboxEvent {
        id: Uuid::new_v4(),
        reservation_id: Uuid::new_v4(),
        session_id: Uuid::new_v4(),
        seat_id: Uuid::new_v4(),
        seat_released,
        attempts,
        last_error: None,
        created_at: Utc::now(),
        next_attempt_at: None,
        processed_at: None,
        failed_at: None,
    };
    let id = event.id;
    state.expiration_outbox.push(event);
    id
}

/// Insert a creation-flavor outbox row directly, for relay tests.
pub fn seed_outbox_event(store: &InMemoryStore, attempts: i32) -> Uuid {
    let mut state = store.state.lock().unwrap();
    let mut event = new_outbox_event(
        EVENT_RESERVATION_CREATED,
        serde_json::json!({"reservationId": Uuid::new_v4()}),
        Utc::now(),
    );
    event.attempts = attempts;
    let id = event.id;
    state.outbox.push(event);
    id
}
