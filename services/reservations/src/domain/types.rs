use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_domain::reservation::ReservationStatus;
use boxoffice_domain::seat::SeatStatus;
use boxoffice_domain::session::SessionStatus;

use crate::error::ReservationsServiceError;

/// Session data needed for reservation decisions, read from the catalog-owned
/// `event_sessions` table.
#[derive(Debug, Clone)]
pub struct EventSession {
    pub id: Uuid,
    pub status: SessionStatus,
    /// Ticket price in minor currency units.
    pub ticket_price: i64,
    /// Minimum provisioned seats before the session is reservable.
    pub min_seats: i32,
}

#[derive(Debug, Clone)]
pub struct Seat {
    pub id: Uuid,
    pub session_id: Uuid,
    pub label: String,
    pub status: SeatStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's temporary hold on exactly one seat.
#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: Uuid,
    pub session_id: Uuid,
    pub seat_id: Uuid,
    pub user_id: Uuid,
    pub status: ReservationStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Checks the sale-confirmation preconditions: ownership, then status,
    /// then expiry. The expiry check is `now > expires_at`, so a confirmation
    /// at the exact boundary still succeeds.
    pub fn ensure_confirmable(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError> {
        if self.user_id != user_id {
            return Err(ReservationsServiceError::Forbidden);
        }
        if self.status != ReservationStatus::Pending {
            return Err(ReservationsServiceError::ReservationNotPending);
        }
        if now > self.expires_at {
            return Err(ReservationsServiceError::ReservationExpired);
        }
        Ok(())
    }

    /// Cancellation shares the ownership and pending-only preconditions but
    /// not the expiry check (a cancel of an about-to-expire hold is fine).
    pub fn ensure_cancellable(&self, user_id: Uuid) -> Result<(), ReservationsServiceError> {
        if self.user_id != user_id {
            return Err(ReservationsServiceError::Forbidden);
        }
        if self.status != ReservationStatus::Pending {
            return Err(ReservationsServiceError::ReservationNotPending);
        }
        Ok(())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == ReservationStatus::Pending && self.expires_at <= now
    }
}

#[derive(Debug, Clone)]
pub struct Sale {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub session_id: Uuid,
    pub seat_id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Validated input for one atomic multi-seat claim. `seat_ids` is already in
/// canonical order when this is handed to the repository.
#[derive(Debug, Clone)]
pub struct ReservationBatch {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub expires_at: DateTime<Utc>,
}

/// Creation-flavor outbox row (reservation.created, payment.confirmed).
#[derive(Debug, Clone)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// Expiration-flavor outbox row, one per swept reservation.
#[derive(Debug, Clone)]
pub struct ExpirationOutboxEvent {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub session_id: Uuid,
    pub seat_id: Uuid,
    pub seat_released: bool,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub next_attempt_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

/// What a single sweep step did to one reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpireOutcome {
    pub reservation_id: Uuid,
    pub seat_id: Uuid,
    pub seat_released: bool,
}

/// Cached response for an idempotency key: HTTP status plus JSON body,
/// replayed verbatim on retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

// ── Limits and tunables ──────────────────────────────────────────────────────

/// Seats per reservation request, inclusive upper bound.
pub const MAX_SEATS_PER_RESERVATION: usize = 20;

/// Published event names.
pub const EVENT_RESERVATION_CREATED: &str = "reservation.created";
pub const EVENT_RESERVATION_EXPIRED: &str = "reservation.expired";
pub const EVENT_SEAT_RELEASED: &str = "seat.released";
pub const EVENT_PAYMENT_CONFIRMED: &str = "payment.confirmed";

/// Background-job lock keys. One holder per key across all instances.
pub const SWEEP_LOCK_KEY: &str = "lock:sweep:reservations";
pub const RELAY_LOCK_KEY: &str = "lock:relay:outbox";
pub const CLEANUP_LOCK_KEY: &str = "lock:cleanup:outbox";

/// Lock TTLs, shorter than the owning job's interval so a crashed holder
/// self-heals before the next tick.
pub const SWEEP_LOCK_TTL_SECS: u64 = 8;
pub const RELAY_LOCK_TTL_SECS: u64 = 4;
pub const CLEANUP_LOCK_TTL_SECS: u64 = 300;

/// Rows fetched per sweep / relay tick.
pub const SWEEP_BATCH_SIZE: u64 = 200;
pub const RELAY_BATCH_SIZE: u64 = 50;

/// Publish attempts before an outbox row is dead-lettered.
pub const MAX_PUBLISH_ATTEMPTS: i32 = 10;

/// Idempotency guard: in-flight lease and cached-response lifetimes.
pub const IDEMPOTENCY_LEASE_SECS: u64 = 30;
pub const IDEMPOTENCY_RESPONSE_TTL_SECS: u64 = 24 * 60 * 60;
