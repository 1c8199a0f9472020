use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

/// Reservations service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum ReservationsServiceError {
    #[error("invalid seat selection")]
    InvalidSeatSelection,
    #[error("session is not on sale")]
    SessionNotActive,
    #[error("session has too few seats")]
    SessionTooSmall,
    #[error("session not found")]
    SessionNotFound,
    #[error("seat not found")]
    SeatNotFound,
    #[error("reservation not found")]
    ReservationNotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("seat already taken")]
    SeatConflict(Uuid),
    #[error("seat label already exists in session")]
    DuplicateSeatLabel,
    #[error("illegal seat status transition")]
    InvalidSeatTransition,
    #[error("reservation is not pending")]
    ReservationNotPending,
    #[error("reservation expired")]
    ReservationExpired,
    #[error("seat is not reserved")]
    SeatNotReserved,
    #[error("request with this idempotency key is in flight")]
    IdempotencyInFlight,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ReservationsServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSeatSelection => "INVALID_SEAT_SELECTION",
            Self::SessionNotActive => "SESSION_NOT_ACTIVE",
            Self::SessionTooSmall => "SESSION_TOO_SMALL",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::SeatNotFound => "SEAT_NOT_FOUND",
            Self::ReservationNotFound => "RESERVATION_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::SeatConflict(_) => "SEAT_CONFLICT",
            Self::DuplicateSeatLabel => "DUPLICATE_SEAT_LABEL",
            Self::InvalidSeatTransition => "INVALID_SEAT_TRANSITION",
            Self::ReservationNotPending => "RESERVATION_NOT_PENDING",
            Self::ReservationExpired => "RESERVATION_EXPIRED",
            Self::SeatNotReserved => "SEAT_NOT_RESERVED",
            Self::IdempotencyInFlight => "IDEMPOTENCY_IN_FLIGHT",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSeatSelection | Self::SessionNotActive | Self::SessionTooSmall => {
                StatusCode::BAD_REQUEST
            }
            Self::SessionNotFound | Self::SeatNotFound | Self::ReservationNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::SeatConflict(_)
            | Self::DuplicateSeatLabel
            | Self::InvalidSeatTransition
            | Self::ReservationNotPending
            | Self::ReservationExpired
            | Self::SeatNotReserved
            | Self::IdempotencyInFlight => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ReservationsServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Self::SeatConflict(seat_id) = &self {
            body["seatId"] = serde_json::json!(seat_id);
        }
        (status, axum::Json(body)).into_response()
    }
}
