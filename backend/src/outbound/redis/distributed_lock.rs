//! Redis-backed `DistributedLock` implementation.
//!
//! The lock is a single key written with `SET NX PX`. The value is a random
//! owner id, and release runs a compare-and-delete script so a lease that
//! expired and was re-acquired elsewhere is never deleted by the old owner.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{AsyncCommands, ExistenceCheck, Script, SetExpiry, SetOptions};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::domain::ports::{DistributedLock, LockError, LockLease};

use super::{checkout_message, RedisPool};

const RELEASE_SCRIPT: &str = r"if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end";

fn map_redis_error(error: bb8_redis::redis::RedisError) -> LockError {
    LockError::backend(error.to_string())
}

/// Redis-backed implementation of the distributed lock port.
#[derive(Clone)]
pub struct RedisDistributedLock {
    pool: RedisPool,
}

impl RedisDistributedLock {
    /// Create a lock over the shared pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, bb8_redis::RedisConnectionManager>, LockError>
    {
        self.pool
            .get()
            .await
            .map_err(|err| LockError::backend(checkout_message(err)))
    }
}

#[async_trait]
impl DistributedLock for RedisDistributedLock {
    async fn acquire(
        &self,
        key: &str,
        ttl: Duration,
        retries: u32,
        retry_delay: Duration,
    ) -> Result<LockLease, LockError> {
        let owner = Uuid::new_v4().to_string();
        let ttl_ms = ttl.as_millis() as u64;
        let mut rng = SmallRng::from_entropy();
        let attempts = retries + 1;

        for attempt in 0..attempts {
            let options = SetOptions::default()
                .conditional_set(ExistenceCheck::NX)
                .with_expiration(SetExpiry::PX(ttl_ms));
            let mut conn = self.connection().await?;
            let reply: Option<String> = conn
                .set_options(key, owner.as_str(), options)
                .await
                .map_err(map_redis_error)?;
            if reply.is_some() {
                return Ok(LockLease {
                    key: key.to_owned(),
                    owner: owner.clone(),
                });
            }
            drop(conn);

            if attempt + 1 < attempts {
                // Jitter spreads contending retries apart.
                let jitter = rng.gen_range(0..=retry_delay.as_millis() as u64 / 2);
                tokio::time::sleep(retry_delay + Duration::from_millis(jitter)).await;
            }
        }

        Err(LockError::Contended {
            key: key.to_owned(),
            attempts,
        })
    }

    async fn release(&self, lease: &LockLease) -> Result<bool, LockError> {
        let mut conn = self.connection().await?;
        let deleted: i64 = Script::new(RELEASE_SCRIPT)
            .key(lease.key.as_str())
            .arg(lease.owner.as_str())
            .invoke_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        Ok(deleted == 1)
    }
}
