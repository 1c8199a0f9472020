use anyhow::Context as _;
use deadpool_redis::Pool;

use crate::domain::repository::MessageChannel;

/// Message channel backed by Redis pub/sub. The broker side is a black box;
/// this is the only writer, and delivery guarantees come from the outbox
/// retry loop, not from the transport.
#[derive(Clone)]
pub struct RedisMessageChannel {
    pub pool: Pool,
}

impl MessageChannel for RedisMessageChannel {
    async fn publish(&self, event: &str, payload: &serde_json::Value) -> anyhow::Result<()> {
        let message = serde_json::to_string(payload).context("serialize event payload")?;
        let mut conn = self.pool.get().await.context("get redis connection")?;
        let _: u64 = deadpool_redis::redis::cmd("PUBLISH")
            .arg(event)
            .arg(message)
            .query_async(&mut conn)
            .await
            .context("publish event")?;
        Ok(())
    }
}
