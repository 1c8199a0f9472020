use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::SaleRepository;
use crate::domain::types::Sale;
use crate::error::ReservationsServiceError;

pub struct ConfirmSaleInput {
    pub reservation_id: Uuid,
    pub user_id: Uuid,
}

/// Sale confirmation engine. The ownership/status/expiry checks and the seat
/// flip happen inside the repository transaction under exclusive row locks so
/// they serialize against the expiration sweeper; this use case supplies the
/// decision timestamp.
pub struct ConfirmSaleUseCase<S: SaleRepository> {
    pub sales: S,
}

impl<S: SaleRepository> ConfirmSaleUseCase<S> {
    pub async fn execute(&self, input: ConfirmSaleInput) -> Result<Sale, ReservationsServiceError> {
        self.sales
            .confirm_sale(input.reservation_id, input.user_id, Utc::now())
            .await
    }
}
