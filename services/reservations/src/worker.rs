//! Periodic background jobs: expiration sweep, outbox relay, outbox cleanup.
//!
//! Every instance runs every loop; the distributed lock inside each use case
//! decides which instance actually does the work on a given tick.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::config::ReservationsConfig;
use crate::state::AppState;
use crate::usecase::cleanup::CleanupOutboxUseCase;
use crate::usecase::expire::SweepReservationsUseCase;
use crate::usecase::relay::RelayOutboxUseCase;

pub fn spawn_background_jobs(state: AppState, config: &ReservationsConfig) {
    tokio::spawn(sweep_loop(
        state.clone(),
        Duration::from_secs(config.sweep_interval_secs),
    ));
    tokio::spawn(relay_loop(
        state.clone(),
        Duration::from_secs(config.relay_interval_secs),
    ));
    tokio::spawn(cleanup_loop(
        state,
        Duration::from_secs(config.cleanup_interval_secs),
        config.outbox_retention_days,
    ));
}

async fn sweep_loop(state: AppState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let usecase = SweepReservationsUseCase {
            lock: state.lock(),
            reservations: state.reservation_repo(),
        };
        match usecase.execute().await {
            Ok(report) if report.skipped => {}
            Ok(report) => {
                if report.expired > 0 || report.failed > 0 {
                    info!(
                        expired = report.expired,
                        released = report.released,
                        failed = report.failed,
                        "reservation sweep complete"
                    );
                }
            }
            Err(e) => error!(error = %e, "reservation sweep failed"),
        }
    }
}

async fn relay_loop(state: AppState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let usecase = RelayOutboxUseCase {
            lock: state.lock(),
            outbox: state.outbox_repo(),
            expirations: state.expiration_outbox_repo(),
            channel: state.message_channel(),
        };
        match usecase.execute().await {
            Ok(report) if report.skipped => {}
            Ok(report) => {
                if report.published > 0 || report.failed > 0 {
                    info!(
                        published = report.published,
                        failed = report.failed,
                        "outbox relay complete"
                    );
                }
            }
            Err(e) => error!(error = %e, "outbox relay failed"),
        }
    }
}

async fn cleanup_loop(state: AppState, period: Duration, retention_days: i64) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let usecase = CleanupOutboxUseCase {
            lock: state.lock(),
            outbox: state.outbox_repo(),
            expirations: state.expiration_outbox_repo(),
            retention_days,
        };
        match usecase.execute().await {
            Ok(report) if report.skipped => {}
            Ok(report) => {
                if report.deleted > 0 {
                    info!(deleted = report.deleted, "outbox cleanup complete");
                }
            }
            Err(e) => error!(error = %e, "outbox cleanup failed"),
        }
    }
}
