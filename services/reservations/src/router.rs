use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use boxoffice_core::health::{healthz, readyz};
use boxoffice_core::middleware::request_id_layer;

use crate::handlers::{
    reservation::{cancel_reservation, create_reservation},
    sale::create_sale,
    seat::{get_seats, provision_seats, update_seat_status},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Reservations
        .route("/reservations", post(create_reservation))
        .route("/reservations/{reservation_id}", delete(cancel_reservation))
        // Sales
        .route("/sales", post(create_sale))
        // Seats
        .route("/sessions/{session_id}/seats", get(get_seats))
        .route("/sessions/{session_id}/seats", post(provision_seats))
        .route("/seats/{seat_id}/status", patch(update_seat_status))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
