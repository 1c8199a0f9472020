use deadpool_redis::Pool;
use deadpool_redis::redis::AsyncCommands;

use crate::domain::repository::{DistributedLock, IdempotencyStore};
use crate::domain::types::StoredResponse;
use crate::error::ReservationsServiceError;

// ── Distributed lock ─────────────────────────────────────────────────────────

/// Redis-backed lease lock: SET NX EX to acquire, DEL to release.
///
/// Release is an unconditional DEL, so a holder that outlived its TTL can in
/// principle delete the next holder's lease. The guarded jobs tolerate an
/// overlapping tick (every mutation re-checks state under its own row lock),
/// and the TTL means a crashed holder self-heals before the next tick.
#[derive(Clone)]
pub struct RedisDistributedLock {
    pub pool: Pool,
}

impl DistributedLock for RedisDistributedLock {
    async fn acquire(&self, key: &str, ttl_secs: u64) -> Result<bool, ReservationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let acquired: Option<String> = deadpool_redis::redis::cmd("SET")
            .arg(key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        Ok(acquired.is_some())
    }

    async fn release(&self, key: &str) -> Result<(), ReservationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let _: u64 = conn
            .del(key)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        Ok(())
    }
}

// ── Idempotency store ────────────────────────────────────────────────────────

fn lease_key(key: &str) -> String {
    format!("idem:lock:{key}")
}

fn response_key(key: &str) -> String {
    format!("idem:resp:{key}")
}

/// Redis-backed idempotency record: a short-lease in-flight marker plus a
/// longer-lived cached response, under separate keys.
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    pub pool: Pool,
}

impl IdempotencyStore for RedisIdempotencyStore {
    async fn begin(&self, key: &str, lease_secs: u64) -> Result<bool, ReservationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let taken: Option<String> = deadpool_redis::redis::cmd("SET")
            .arg(lease_key(key))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(lease_secs)
            .query_async(&mut conn)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        Ok(taken.is_some())
    }

    async fn find_response(
        &self,
        key: &str,
    ) -> Result<Option<StoredResponse>, ReservationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let value: Option<String> = conn
            .get(response_key(key))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        value
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    ReservationsServiceError::Internal(
                        anyhow::Error::new(e).context("decode cached idempotent response"),
                    )
                })
            })
            .transpose()
    }

    async fn store_response(
        &self,
        key: &str,
        response: &StoredResponse,
        ttl_secs: u64,
    ) -> Result<(), ReservationsServiceError> {
        let raw = serde_json::to_string(response).map_err(|e| {
            ReservationsServiceError::Internal(
                anyhow::Error::new(e).context("encode idempotent response"),
            )
        })?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let (): () = conn
            .set_ex(response_key(key), raw, ttl_secs)
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        Ok(())
    }

    async fn abandon(&self, key: &str) -> Result<(), ReservationsServiceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| ReservationsServiceError::Internal(e.into()))?;
        let _: u64 = conn
            .del(lease_key(key))
            .await
            .map_err(|e: deadpool_redis::redis::RedisError| {
                ReservationsServiceError::Internal(e.into())
            })?;
        Ok(())
    }
}
