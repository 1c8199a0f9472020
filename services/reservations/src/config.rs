/// Reservations service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ReservationsConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// TCP port to listen on (default 3113). Env var: `RESERVATIONS_PORT`.
    pub reservations_port: u16,
    /// Reservation TTL in seconds (default 30). Env var: `RESERVATION_TTL_SECS`.
    pub reservation_ttl_secs: i64,
    /// Expiration sweep interval in seconds (default 10). Env var: `SWEEP_INTERVAL_SECS`.
    pub sweep_interval_secs: u64,
    /// Outbox relay interval in seconds (default 5). Env var: `RELAY_INTERVAL_SECS`.
    pub relay_interval_secs: u64,
    /// Outbox cleanup interval in seconds (default 3600). Env var: `CLEANUP_INTERVAL_SECS`.
    pub cleanup_interval_secs: u64,
    /// Days a published outbox row is retained (default 7). Env var: `OUTBOX_RETENTION_DAYS`.
    pub outbox_retention_days: i64,
}

impl ReservationsConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            reservations_port: std::env::var("RESERVATIONS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3113),
            reservation_ttl_secs: std::env::var("RESERVATION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            relay_interval_secs: std::env::var("RELAY_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            cleanup_interval_secs: std::env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            outbox_retention_days: std::env::var("OUTBOX_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(7),
        }
    }
}
