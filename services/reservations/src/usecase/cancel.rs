use uuid::Uuid;

use crate::domain::repository::ReservationRepository;
use crate::error::ReservationsServiceError;

pub struct CancelReservationInput {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
}

/// Cancels a pending reservation. Shares the pending-only precondition with
/// the sale engine; the repository releases the seat if it is still reserved.
pub struct CancelReservationUseCase<R: ReservationRepository> {
    pub reservations: R,
}

impl<R: ReservationRepository> CancelReservationUseCase<R> {
    pub async fn execute(
        &self,
        input: CancelReservationInput,
    ) -> Result<(), ReservationsServiceError> {
        self.reservations
            .cancel(input.reservation_id, input.user_id)
            .await
    }
}
