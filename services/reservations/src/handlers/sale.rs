use anyhow::Context as _;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;

use crate::domain::types::{Sale, StoredResponse};
use crate::error::ReservationsServiceError;
use crate::state::AppState;
use crate::usecase::confirm_sale::{ConfirmSaleInput, ConfirmSaleUseCase};
use crate::usecase::idempotency::IdempotencyGuard;

use super::replay;

// ── POST /sales ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub reservation_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleResponse {
    pub id: Uuid,
    pub reservation_id: Uuid,
    pub session_id: Uuid,
    pub seat_id: Uuid,
    pub amount: i64,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            reservation_id: sale.reservation_id,
            session_id: sale.session_id,
            seat_id: sale.seat_id,
            amount: sale.amount,
            created_at: sale.created_at,
        }
    }
}

pub async fn create_sale(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateSaleRequest>,
) -> Result<Response, ReservationsServiceError> {
    let key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let guard = IdempotencyGuard {
        store: state.idempotency_store(),
    };
    let stored = guard
        .run("sales:create", key.as_deref(), || async {
            let usecase = ConfirmSaleUseCase {
                sales: state.sale_repo(),
            };
            let sale = usecase
                .execute(ConfirmSaleInput {
                    reservation_id: body.reservation_id,
                    user_id: identity.user_id,
                })
                .await?;
            Ok(StoredResponse {
                status: StatusCode::CREATED.as_u16(),
                body: serde_json::to_value(SaleResponse::from(sale))
                    .context("serialize sale response")?,
            })
        })
        .await?;
    Ok(replay(stored))
}
