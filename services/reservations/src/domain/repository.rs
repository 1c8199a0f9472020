#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use boxoffice_domain::pagination::PageRequest;
use boxoffice_domain::seat::SeatStatus;

use crate::domain::types::{
    EventSession, ExpirationOutboxEvent, ExpireOutcome, OutboxEvent, Reservation,
    ReservationBatch, Sale, Seat, StoredResponse,
};
use crate::error::ReservationsServiceError;

/// Port for session lookups (catalog-owned data, read-only here).
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self, id: Uuid)
    -> Result<Option<EventSession>, ReservationsServiceError>;
}

/// Repository for seats.
pub trait SeatRepository: Send + Sync {
    /// Number of provisioned seats in a session (any status).
    async fn count_in_session(&self, session_id: Uuid) -> Result<u64, ReservationsServiceError>;

    async fn list_in_session(
        &self,
        session_id: Uuid,
        status: Option<SeatStatus>,
        page: PageRequest,
    ) -> Result<Vec<Seat>, ReservationsServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Seat>, ReservationsServiceError>;

    /// Insert one available seat per label. Duplicate label in the session is
    /// a conflict.
    async fn provision(
        &self,
        session_id: Uuid,
        labels: &[String],
    ) -> Result<Vec<Seat>, ReservationsServiceError>;

    /// Conditional `from -> to` status update bumping the version. Returns
    /// `false` when the seat was no longer in `from` (lost race).
    async fn transition(
        &self,
        seat_id: Uuid,
        from: SeatStatus,
        to: SeatStatus,
    ) -> Result<bool, ReservationsServiceError>;
}

/// Repository for reservations, including the two transactional engines that
/// must stay atomic at the storage layer.
pub trait ReservationRepository: Send + Sync {
    /// Claim every seat in `batch` (already canonically ordered) and insert
    /// one pending reservation plus one `reservation.created` outbox row per
    /// seat, all in one transaction. Any seat not `available` aborts the
    /// whole batch with `SeatConflict`.
    async fn reserve_seats(
        &self,
        batch: &ReservationBatch,
    ) -> Result<Vec<Reservation>, ReservationsServiceError>;

    /// Pending reservations whose expiry has passed, oldest first.
    async fn find_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<Reservation>, ReservationsServiceError>;

    /// Expire one reservation in its own transaction: re-check pending under
    /// an exclusive lock, mark expired, release the seat only if still
    /// reserved, and write the expiration outbox row. Returns `None` when the
    /// reservation was no longer pending (someone else won the race).
    async fn expire_one(
        &self,
        reservation_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<ExpireOutcome>, ReservationsServiceError>;

    /// Owner-checked, pending-only cancellation; releases the seat if still
    /// reserved.
    async fn cancel(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), ReservationsServiceError>;
}

/// Repository for sales.
pub trait SaleRepository: Send + Sync {
    /// The sale-confirmation engine: one transaction taking exclusive row
    /// locks on the reservation and seat (serializing against the sweeper),
    /// validating via `Reservation::ensure_confirmable`, then flipping
    /// reservation -> confirmed, seat -> sold and inserting the sale plus a
    /// `payment.confirmed` outbox row.
    async fn confirm_sale(
        &self,
        reservation_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Sale, ReservationsServiceError>;
}

/// Relay-side access to the creation-flavor outbox.
pub trait OutboxRepository: Send + Sync {
    /// Unpublished, not-dead-lettered rows due at `now`, oldest first.
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<OutboxEvent>, ReservationsServiceError>;

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError>;

    /// Record a failed publish attempt. `next_attempt_at = None` dead-letters
    /// the row (sets failed_at).
    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError>;

    /// Retention cleanup: delete published rows older than `cutoff`.
    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError>;
}

/// Relay-side access to the expiration-flavor outbox.
pub trait ExpirationOutboxRepository: Send + Sync {
    async fn fetch_due(
        &self,
        now: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<ExpirationOutboxEvent>, ReservationsServiceError>;

    async fn mark_published(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError>;

    async fn record_failure(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<(), ReservationsServiceError>;

    async fn delete_published_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationsServiceError>;
}

/// Lease-based cross-instance mutual exclusion for background jobs.
pub trait DistributedLock: Send + Sync {
    /// Try to take the lease. `false` means another instance holds it; skip
    /// the tick. The TTL bounds how long a crashed holder can starve the job.
    async fn acquire(&self, key: &str, ttl_secs: u64) -> Result<bool, ReservationsServiceError>;

    async fn release(&self, key: &str) -> Result<(), ReservationsServiceError>;
}

/// Fast shared store backing the idempotency guard.
pub trait IdempotencyStore: Send + Sync {
    /// Atomic set-if-absent of the in-flight lease. `true` means this caller
    /// owns the key and should execute the operation.
    async fn begin(&self, key: &str, lease_secs: u64) -> Result<bool, ReservationsServiceError>;

    async fn find_response(
        &self,
        key: &str,
    ) -> Result<Option<StoredResponse>, ReservationsServiceError>;

    async fn store_response(
        &self,
        key: &str,
        response: &StoredResponse,
        ttl_secs: u64,
    ) -> Result<(), ReservationsServiceError>;

    /// Drop the lease after a failed execution so the client may retry.
    async fn abandon(&self, key: &str) -> Result<(), ReservationsServiceError>;
}

/// Outbound message channel (broker transport is a black box).
pub trait MessageChannel: Send + Sync {
    async fn publish(&self, event: &str, payload: &serde_json::Value) -> anyhow::Result<()>;
}
