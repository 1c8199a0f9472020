use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use boxoffice_core::identity::IdentityHeaders;
use boxoffice_domain::pagination::PageRequest;
use boxoffice_domain::seat::SeatStatus;

use crate::domain::types::Seat;
use crate::error::ReservationsServiceError;
use crate::state::AppState;
use crate::usecase::provision::{
    ProvisionSeatsInput, ProvisionSeatsUseCase, UpdateSeatStatusInput, UpdateSeatStatusUseCase,
};
use crate::usecase::seats::ListSeatsUseCase;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct SeatResponse {
    pub id: Uuid,
    pub label: String,
    pub status: &'static str,
    pub version: i32,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        Self {
            id: seat.id,
            label: seat.label,
            status: seat.status.as_str(),
            version: seat.version,
        }
    }
}

// ── GET /sessions/{session_id}/seats ─────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct SeatListQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub status: Option<String>,
}

pub async fn get_seats(
    _identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    axum::extract::RawQuery(raw_query): axum::extract::RawQuery,
) -> Result<Json<Vec<SeatResponse>>, ReservationsServiceError> {
    let query: SeatListQuery = raw_query
        .as_deref()
        .map(serde_qs::from_str)
        .transpose()
        .map_err(|_| ReservationsServiceError::InvalidSeatSelection)?
        .unwrap_or_default();

    let status = query
        .status
        .as_deref()
        .map(|s| SeatStatus::parse(s).ok_or(ReservationsServiceError::InvalidSeatSelection))
        .transpose()?;

    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };

    let usecase = ListSeatsUseCase {
        sessions: state.session_provider(),
        seats: state.seat_repo(),
    };
    let seats = usecase.execute(session_id, status, page).await?;
    Ok(Json(seats.into_iter().map(SeatResponse::from).collect()))
}

// ── POST /sessions/{session_id}/seats ────────────────────────────────────────

#[derive(Deserialize)]
pub struct ProvisionSeatsRequest {
    pub labels: Vec<String>,
}

pub async fn provision_seats(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<ProvisionSeatsRequest>,
) -> Result<(StatusCode, Json<Vec<SeatResponse>>), ReservationsServiceError> {
    if identity.user_role < 1 {
        return Err(ReservationsServiceError::Forbidden);
    }
    let usecase = ProvisionSeatsUseCase {
        sessions: state.session_provider(),
        seats: state.seat_repo(),
    };
    let seats = usecase
        .execute(ProvisionSeatsInput {
            session_id,
            labels: body.labels,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(seats.into_iter().map(SeatResponse::from).collect()),
    ))
}

// ── PATCH /seats/{seat_id}/status ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateSeatStatusRequest {
    pub status: String,
}

pub async fn update_seat_status(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(seat_id): Path<Uuid>,
    Json(body): Json<UpdateSeatStatusRequest>,
) -> Result<Json<SeatResponse>, ReservationsServiceError> {
    if identity.user_role < 1 {
        return Err(ReservationsServiceError::Forbidden);
    }
    let target = SeatStatus::parse(&body.status)
        .ok_or(ReservationsServiceError::InvalidSeatTransition)?;
    let usecase = UpdateSeatStatusUseCase {
        seats: state.seat_repo(),
    };
    let seat = usecase
        .execute(UpdateSeatStatusInput { seat_id, target })
        .await?;
    Ok(Json(seat.into()))
}
