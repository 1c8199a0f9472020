use tracing::warn;

use crate::domain::repository::IdempotencyStore;
use crate::domain::types::{
    IDEMPOTENCY_LEASE_SECS, IDEMPOTENCY_RESPONSE_TTL_SECS, StoredResponse,
};
use crate::error::ReservationsServiceError;

/// Idempotency guard wrapping a mutating operation.
///
/// With a key present, the operation runs at most once per (scope, key):
/// the first caller takes the in-flight lease and executes; its successful
/// response is cached and replayed verbatim to retries. A retry arriving
/// while the original is still executing gets a distinct retry-shortly
/// conflict. Same key ⇒ same cached result, regardless of body differences.
pub struct IdempotencyGuard<S: IdempotencyStore> {
    pub store: S,
}

impl<S: IdempotencyStore> IdempotencyGuard<S> {
    pub async fn run<F, Fut>(
        &self,
        scope: &str,
        key: Option<&str>,
        op: F,
    ) -> Result<StoredResponse, ReservationsServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<StoredResponse, ReservationsServiceError>>,
    {
        // No key, no deduplication.
        let Some(key) = key else {
            return op().await;
        };
        let scoped = format!("{scope}:{key}");

        if self.store.begin(&scoped, IDEMPOTENCY_LEASE_SECS).await? {
            match op().await {
                Ok(response) => {
                    self.store
                        .store_response(&scoped, &response, IDEMPOTENCY_RESPONSE_TTL_SECS)
                        .await?;
                    Ok(response)
                }
                Err(e) => {
                    // Failed executions are not cached; drop the lease so the
                    // client can retry immediately.
                    if let Err(abandon_err) = self.store.abandon(&scoped).await {
                        warn!(key = %scoped, error = %abandon_err, "failed to drop idempotency lease");
                    }
                    Err(e)
                }
            }
        } else {
            match self.store.find_response(&scoped).await? {
                Some(cached) => Ok(cached),
                // Original call still in flight.
                None => Err(ReservationsServiceError::IdempotencyInFlight),
            }
        }
    }
}
