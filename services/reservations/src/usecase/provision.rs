use uuid::Uuid;

use boxoffice_domain::seat::SeatStatus;

use crate::domain::repository::{SeatRepository, SessionProvider};
use crate::domain::types::Seat;
use crate::error::ReservationsServiceError;

pub struct ProvisionSeatsInput {
    pub session_id: Uuid,
    pub labels: Vec<String>,
}

/// Admin seat provisioning: inserts one available seat per label.
pub struct ProvisionSeatsUseCase<P, S>
where
    P: SessionProvider,
    S: SeatRepository,
{
    pub sessions: P,
    pub seats: S,
}

impl<P, S> ProvisionSeatsUseCase<P, S>
where
    P: SessionProvider,
    S: SeatRepository,
{
    pub async fn execute(
        &self,
        input: ProvisionSeatsInput,
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        if input.labels.is_empty() || input.labels.iter().any(|l| l.trim().is_empty()) {
            return Err(ReservationsServiceError::InvalidSeatSelection);
        }
        self.sessions
            .get_session(input.session_id)
            .await?
            .ok_or(ReservationsServiceError::SessionNotFound)?;
        self.seats.provision(input.session_id, &input.labels).await
    }
}

pub struct UpdateSeatStatusInput {
    pub seat_id: Uuid,
    pub target: SeatStatus,
}

/// Admin seat-status transition (block / unblock / maintenance), validated
/// against the domain transition table and applied as a version-checked
/// conditional update.
pub struct UpdateSeatStatusUseCase<S: SeatRepository> {
    pub seats: S,
}

impl<S: SeatRepository> UpdateSeatStatusUseCase<S> {
    pub async fn execute(
        &self,
        input: UpdateSeatStatusInput,
    ) -> Result<Seat, ReservationsServiceError> {
        // reserved/sold belong to the reservation and sale engines.
        if matches!(input.target, SeatStatus::Reserved | SeatStatus::Sold) {
            return Err(ReservationsServiceError::InvalidSeatTransition);
        }

        let seat = self
            .seats
            .find_by_id(input.seat_id)
            .await?
            .ok_or(ReservationsServiceError::SeatNotFound)?;

        seat.status
            .checked_transition(input.target)
            .map_err(|_| ReservationsServiceError::InvalidSeatTransition)?;

        // Conditional on the status we just read; a lost race is a conflict.
        let applied = self
            .seats
            .transition(seat.id, seat.status, input.target)
            .await?;
        if !applied {
            return Err(ReservationsServiceError::InvalidSeatTransition);
        }

        self.seats
            .find_by_id(seat.id)
            .await?
            .ok_or(ReservationsServiceError::SeatNotFound)
    }
}
