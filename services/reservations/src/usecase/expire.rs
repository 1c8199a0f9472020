use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::repository::{DistributedLock, ReservationRepository};
use crate::domain::types::{SWEEP_BATCH_SIZE, SWEEP_LOCK_KEY, SWEEP_LOCK_TTL_SECS};
use crate::error::ReservationsServiceError;

/// What one sweep tick did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Another instance held the lock; nothing was swept.
    pub skipped: bool,
    pub expired: usize,
    pub released: usize,
    pub failed: usize,
}

impl SweepReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Expiration sweeper: expires pending reservations past their expiry and
/// releases their seats, effectively-once across instances via the
/// distributed lock. Each reservation is handled in its own transaction so
/// one bad row cannot block the rest.
pub struct SweepReservationsUseCase<L, R>
where
    L: DistributedLock,
    R: ReservationRepository,
{
    pub lock: L,
    pub reservations: R,
}

impl<L, R> SweepReservationsUseCase<L, R>
where
    L: DistributedLock,
    R: ReservationRepository,
{
    pub async fn execute(&self) -> Result<SweepReport, ReservationsServiceError> {
        if !self.lock.acquire(SWEEP_LOCK_KEY, SWEEP_LOCK_TTL_SECS).await? {
            debug!("sweep lock held elsewhere, skipping tick");
            return Ok(SweepReport::skipped());
        }
        let outcome = self.sweep().await;
        // Release on every exit path; a failed release only delays the next
        // tick until the TTL lapses.
        if let Err(e) = self.lock.release(SWEEP_LOCK_KEY).await {
            warn!(error = %e, "failed to release sweep lock");
        }
        outcome
    }

    async fn sweep(&self) -> Result<SweepReport, ReservationsServiceError> {
        let now = Utc::now();
        let due = self.reservations.find_due(now, SWEEP_BATCH_SIZE).await?;

        let mut report = SweepReport::default();
        for reservation in due {
            match self.reservations.expire_one(reservation.id, Utc::now()).await {
                Ok(Some(outcome)) => {
                    report.expired += 1;
                    if outcome.seat_released {
                        report.released += 1;
                    }
                }
                // No longer pending — a sale or another sweeper got there first.
                Ok(None) => {}
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        reservation_id = %reservation.id,
                        error = %e,
                        "failed to expire reservation, continuing sweep"
                    );
                }
            }
        }
        Ok(report)
    }
}
