use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, warn};

use boxoffice_domain::backoff::next_delay;

use crate::domain::repository::{
    DistributedLock, ExpirationOutboxRepository, MessageChannel, OutboxRepository,
};
use crate::domain::types::{
    EVENT_RESERVATION_EXPIRED, EVENT_SEAT_RELEASED, ExpirationOutboxEvent, MAX_PUBLISH_ATTEMPTS,
    RELAY_BATCH_SIZE, RELAY_LOCK_KEY, RELAY_LOCK_TTL_SECS,
};
use crate::error::ReservationsServiceError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub skipped: bool,
    pub published: usize,
    pub failed: usize,
}

impl RelayReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Retry schedule after a failed publish: bumped attempt count plus the next
/// attempt time, or `None` once the attempts are exhausted (dead-letter).
fn backoff_schedule(prior_attempts: i32, now: DateTime<Utc>) -> (i32, Option<DateTime<Utc>>) {
    let attempts = prior_attempts + 1;
    if attempts >= MAX_PUBLISH_ATTEMPTS {
        (attempts, None)
    } else {
        let delay = next_delay(attempts as u32);
        (attempts, Some(now + Duration::seconds(delay.as_secs() as i64)))
    }
}

/// Outbox relay: drains both outbox flavors to the message channel with
/// per-row exponential backoff. Publish failures never abort the batch; the
/// retry state is persisted on the row so restarts keep the backoff.
pub struct RelayOutboxUseCase<L, O, X, C>
where
    L: DistributedLock,
    O: OutboxRepository,
    X: ExpirationOutboxRepository,
    C: MessageChannel,
{
    pub lock: L,
    pub outbox: O,
    pub expirations: X,
    pub channel: C,
}

impl<L, O, X, C> RelayOutboxUseCase<L, O, X, C>
where
    L: DistributedLock,
    O: OutboxRepository,
    X: ExpirationOutboxRepository,
    C: MessageChannel,
{
    pub async fn execute(&self) -> Result<RelayReport, ReservationsServiceError> {
        if !self.lock.acquire(RELAY_LOCK_KEY, RELAY_LOCK_TTL_SECS).await? {
            debug!("relay lock held elsewhere, skipping tick");
            return Ok(RelayReport::skipped());
        }
        let outcome = self.drain().await;
        if let Err(e) = self.lock.release(RELAY_LOCK_KEY).await {
            warn!(error = %e, "failed to release relay lock");
        }
        outcome
    }

    async fn drain(&self) -> Result<RelayReport, ReservationsServiceError> {
        let now = Utc::now();
        let mut report = RelayReport::default();

        for event in self.outbox.fetch_due(now, RELAY_BATCH_SIZE).await? {
            match self.channel.publish(&event.kind, &event.payload).await {
                Ok(()) => {
                    match self.outbox.mark_published(event.id, Utc::now()).await {
                        Ok(()) => report.published += 1,
                        // The row stays unpublished and retries next tick;
                        // at-least-once, so a duplicate is fine.
                        Err(e) => {
                            warn!(outbox_id = %event.id, error = %e, "failed to mark row published")
                        }
                    }
                }
                Err(publish_err) => {
                    report.failed += 1;
                    let stamp = Utc::now();
                    let (attempts, next) = backoff_schedule(event.attempts, stamp);
                    warn!(outbox_id = %event.id, attempts, error = %publish_err, "publish failed");
                    if let Err(e) = self
                        .outbox
                        .record_failure(
                            event.id,
                            attempts,
                            &publish_err.to_string(),
                            next,
                            stamp,
                        )
                        .await
                    {
                        warn!(outbox_id = %event.id, error = %e, "failed to record publish failure");
                    }
                }
            }
        }

        for event in self.expirations.fetch_due(now, RELAY_BATCH_SIZE).await? {
            match self.publish_expiration(&event).await {
                Ok(()) => {
                    match self.expirations.mark_published(event.id, Utc::now()).await {
                        Ok(()) => report.published += 1,
                        Err(e) => {
                            warn!(outbox_id = %event.id, error = %e, "failed to mark row published")
                        }
                    }
                }
                Err(publish_err) => {
                    report.failed += 1;
                    let stamp = Utc::now();
                    let (attempts, next) = backoff_schedule(event.attempts, stamp);
                    warn!(outbox_id = %event.id, attempts, error = %publish_err, "publish failed");
                    if let Err(e) = self
                        .expirations
                        .record_failure(
                            event.id,
                            attempts,
                            &publish_err.to_string(),
                            next,
                            stamp,
                        )
                        .await
                    {
                        warn!(outbox_id = %event.id, error = %e, "failed to record publish failure");
                    }
                }
            }
        }

        Ok(report)
    }

    /// One expiration row can carry two events: the expiry itself, and the
    /// seat release when the sweep actually freed the seat. A failure between
    /// the two re-publishes both next tick — at-least-once, consumers dedupe
    /// by event identity.
    async fn publish_expiration(&self, event: &ExpirationOutboxEvent) -> anyhow::Result<()> {
        let payload = json!({
            "reservationId": event.reservation_id,
            "sessionId": event.session_id,
            "seatId": event.seat_id,
        });
        self.channel
            .publish(EVENT_RESERVATION_EXPIRED, &payload)
            .await?;

        if event.seat_released {
            let payload = json!({
                "seatId": event.seat_id,
                "sessionId": event.session_id,
            });
            self.channel.publish(EVENT_SEAT_RELEASED, &payload).await?;
        }
        Ok(())
    }
}
