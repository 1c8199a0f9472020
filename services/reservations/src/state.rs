use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::{RedisDistributedLock, RedisIdempotencyStore};
use crate::infra::channel::RedisMessageChannel;
use crate::infra::db::{
    DbExpirationOutboxRepository, DbOutboxRepository, DbReservationRepository, DbSaleRepository,
    DbSeatRepository, DbSessionProvider,
};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    /// Reservation TTL in seconds (expires_at = now + TTL).
    pub reservation_ttl_secs: i64,
}

impl AppState {
    pub fn session_provider(&self) -> DbSessionProvider {
        DbSessionProvider {
            db: self.db.clone(),
        }
    }

    pub fn seat_repo(&self) -> DbSeatRepository {
        DbSeatRepository {
            db: self.db.clone(),
        }
    }

    pub fn reservation_repo(&self) -> DbReservationRepository {
        DbReservationRepository {
            db: self.db.clone(),
        }
    }

    pub fn sale_repo(&self) -> DbSaleRepository {
        DbSaleRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository {
            db: self.db.clone(),
        }
    }

    pub fn expiration_outbox_repo(&self) -> DbExpirationOutboxRepository {
        DbExpirationOutboxRepository {
            db: self.db.clone(),
        }
    }

    pub fn lock(&self) -> RedisDistributedLock {
        RedisDistributedLock {
            pool: self.redis.clone(),
        }
    }

    pub fn idempotency_store(&self) -> RedisIdempotencyStore {
        RedisIdempotencyStore {
            pool: self.redis.clone(),
        }
    }

    pub fn message_channel(&self) -> RedisMessageChannel {
        RedisMessageChannel {
            pool: self.redis.clone(),
        }
    }
}
