use chrono::{Duration, Utc};
use tracing::{debug, warn};

use crate::domain::repository::{
    DistributedLock, ExpirationOutboxRepository, OutboxRepository,
};
use crate::domain::types::{CLEANUP_LOCK_KEY, CLEANUP_LOCK_TTL_SECS};
use crate::error::ReservationsServiceError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub skipped: bool,
    pub deleted: u64,
}

/// Retention cleanup: deletes published outbox rows older than the retention
/// window from both flavors. Infrequent, and lock-guarded like the relay.
pub struct CleanupOutboxUseCase<L, O, X>
where
    L: DistributedLock,
    O: OutboxRepository,
    X: ExpirationOutboxRepository,
{
    pub lock: L,
    pub outbox: O,
    pub expirations: X,
    pub retention_days: i64,
}

impl<L, O, X> CleanupOutboxUseCase<L, O, X>
where
    L: DistributedLock,
    O: OutboxRepository,
    X: ExpirationOutboxRepository,
{
    pub async fn execute(&self) -> Result<CleanupReport, ReservationsServiceError> {
        if !self
            .lock
            .acquire(CLEANUP_LOCK_KEY, CLEANUP_LOCK_TTL_SECS)
            .await?
        {
            debug!("cleanup lock held elsewhere, skipping tick");
            return Ok(CleanupReport {
                skipped: true,
                deleted: 0,
            });
        }
        let outcome = self.cleanup().await;
        if let Err(e) = self.lock.release(CLEANUP_LOCK_KEY).await {
            warn!(error = %e, "failed to release cleanup lock");
        }
        outcome
    }

    async fn cleanup(&self) -> Result<CleanupReport, ReservationsServiceError> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);
        let mut deleted = self.outbox.delete_published_before(cutoff).await?;
        deleted += self.expirations.delete_published_before(cutoff).await?;
        Ok(CleanupReport {
            skipped: false,
            deleted,
        })
    }
}
