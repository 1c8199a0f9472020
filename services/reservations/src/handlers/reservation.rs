use anyhow::Context as _;
use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;

use crate::domain::types::{Reservation, StoredResponse};
use crate::error::ReservationsServiceError;
use crate::state::AppState;
use crate::usecase::cancel::{CancelReservationInput, CancelReservationUseCase};
use crate::usecase::idempotency::IdempotencyGuard;
use crate::usecase::reserve::{CreateReservationInput, CreateReservationUseCase};

use super::replay;

// ── POST /reservations ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub session_id: Uuid,
    pub seat_ids: Vec<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: Uuid,
    pub seat_id: Uuid,
    #[serde(serialize_with = "boxoffice_core::serde::to_rfc3339_ms")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(reservation: Reservation) -> Self {
        Self {
            id: reservation.id,
            seat_id: reservation.seat_id,
            expires_at: reservation.expires_at,
        }
    }
}

pub async fn create_reservation(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateReservationRequest>,
) -> Result<Response, ReservationsServiceError> {
    let key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let guard = IdempotencyGuard {
        store: state.idempotency_store(),
    };
    let stored = guard
        .run("reservations:create", key.as_deref(), || async {
            let usecase = CreateReservationUseCase {
                sessions: state.session_provider(),
                seats: state.seat_repo(),
                reservations: state.reservation_repo(),
                ttl_secs: state.reservation_ttl_secs,
            };
            let reservations = usecase
                .execute(CreateReservationInput {
                    session_id: body.session_id,
                    seat_ids: body.seat_ids.clone(),
                    user_id: identity.user_id,
                })
                .await?;
            let items: Vec<ReservationResponse> =
                reservations.into_iter().map(Into::into).collect();
            Ok(StoredResponse {
                status: StatusCode::CREATED.as_u16(),
                body: serde_json::to_value(items).context("serialize reservation response")?,
            })
        })
        .await?;
    Ok(replay(stored))
}

// ── DELETE /reservations/{reservation_id} ────────────────────────────────────

pub async fn cancel_reservation(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(reservation_id): Path<Uuid>,
) -> Result<StatusCode, ReservationsServiceError> {
    let usecase = CancelReservationUseCase {
        reservations: state.reservation_repo(),
    };
    usecase
        .execute(CancelReservationInput {
            reservation_id,
            user_id: identity.user_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
