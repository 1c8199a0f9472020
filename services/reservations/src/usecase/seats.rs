use uuid::Uuid;

use boxoffice_domain::pagination::PageRequest;
use boxoffice_domain::seat::SeatStatus;

use crate::domain::repository::{SeatRepository, SessionProvider};
use crate::domain::types::Seat;
use crate::error::ReservationsServiceError;

/// Paginated seat-map listing for one session.
pub struct ListSeatsUseCase<P, S>
where
    P: SessionProvider,
    S: SeatRepository,
{
    pub sessions: P,
    pub seats: S,
}

impl<P, S> ListSeatsUseCase<P, S>
where
    P: SessionProvider,
    S: SeatRepository,
{
    pub async fn execute(
        &self,
        session_id: Uuid,
        status: Option<SeatStatus>,
        page: PageRequest,
    ) -> Result<Vec<Seat>, ReservationsServiceError> {
        self.sessions
            .get_session(session_id)
            .await?
            .ok_or(ReservationsServiceError::SessionNotFound)?;
        self.seats
            .list_in_session(session_id, status, page.clamped())
            .await
    }
}
