use sea_orm::Database;
use tracing::info;

use boxoffice_core::tracing::init_tracing;
use boxoffice_reservations::config::ReservationsConfig;
use boxoffice_reservations::router::build_router;
use boxoffice_reservations::state::AppState;
use boxoffice_reservations::worker::spawn_background_jobs;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ReservationsConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let state = AppState {
        db,
        redis,
        reservation_ttl_secs: config.reservation_ttl_secs,
    };

    spawn_background_jobs(state.clone(), &config);

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.reservations_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("reservations service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
