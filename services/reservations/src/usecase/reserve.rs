use chrono::{Duration, Utc};
use uuid::Uuid;

use boxoffice_domain::ordering::{canonical_seat_order, has_duplicates};

use crate::domain::repository::{ReservationRepository, SeatRepository, SessionProvider};
use crate::domain::types::{MAX_SEATS_PER_RESERVATION, Reservation, ReservationBatch};
use crate::error::ReservationsServiceError;

pub struct CreateReservationInput {
    pub session_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub user_id: Uuid,
}

/// Reservation creation engine: validates the request, applies the canonical
/// seat ordering, then hands the claim to one atomic repository transaction —
/// all seats reserve or none do.
pub struct CreateReservationUseCase<P, S, R>
where
    P: SessionProvider,
    S: SeatRepository,
    R: ReservationRepository,
{
    pub sessions: P,
    pub seats: S,
    pub reservations: R,
    pub ttl_secs: i64,
}

impl<P, S, R> CreateReservationUseCase<P, S, R>
where
    P: SessionProvider,
    S: SeatRepository,
    R: ReservationRepository,
{
    pub async fn execute(
        &self,
        input: CreateReservationInput,
    ) -> Result<Vec<Reservation>, ReservationsServiceError> {
        // 1. Shape checks before touching anything.
        if input.seat_ids.is_empty()
            || input.seat_ids.len() > MAX_SEATS_PER_RESERVATION
            || has_duplicates(&input.seat_ids)
        {
            return Err(ReservationsServiceError::InvalidSeatSelection);
        }

        // 2. Canonical order before any I/O — two requests sharing seats must
        //    claim them in the same sequence or their row locks can deadlock.
        let seat_ids = canonical_seat_order(input.seat_ids);

        // 3. Session must exist, be on sale, and have enough provisioned seats.
        let session = self
            .sessions
            .get_session(input.session_id)
            .await?
            .ok_or(ReservationsServiceError::SessionNotFound)?;
        if !session.status.is_reservable() {
            return Err(ReservationsServiceError::SessionNotActive);
        }
        let provisioned = self.seats.count_in_session(session.id).await?;
        if provisioned < session.min_seats.max(0) as u64 {
            return Err(ReservationsServiceError::SessionTooSmall);
        }

        // 4. One transaction: claim every seat, insert pending reservations
        //    and their outbox rows.
        let batch = ReservationBatch {
            session_id: session.id,
            user_id: input.user_id,
            seat_ids,
            expires_at: Utc::now() + Duration::seconds(self.ttl_secs),
        };
        self.reservations.reserve_seats(&batch).await
    }
}
