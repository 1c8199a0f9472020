pub mod reservation;
pub mod sale;
pub mod seat;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::types::StoredResponse;

/// Turn a stored (possibly cached) response back into an HTTP response, so an
/// idempotent retry replays exactly what the first call returned.
pub(crate) fn replay(stored: StoredResponse) -> Response {
    let status = StatusCode::from_u16(stored.status).unwrap_or(StatusCode::OK);
    (status, Json(stored.body)).into_response()
}
