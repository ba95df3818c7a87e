//! Redis-backed `QueueStore` implementation.
//!
//! Key layout:
//!
//! - `queue:waiting` — ZSET of waiting tokens scored by enqueue time (ms)
//! - `queue:active` — SET of admitted tokens
//! - `queue:token:{token}` — HASH with `user_id` and `status` fields
//! - `queue:user:{user_id}` — the user's current token, for re-issue
//!
//! Token hashes and user mappings carry the policy TTL so abandoned tokens
//! vanish without a cleanup pass over the hashes. The waiting ZSET and the
//! active SET are swept by the token cleanup worker instead, since members
//! of a collection cannot expire individually.

use std::collections::HashMap;

use async_trait::async_trait;
use bb8_redis::redis::{AsyncCommands, Script};
use chrono::Utc;

use crate::domain::ports::{IssuedToken, QueueCounts, QueueStore, QueueStoreError, TokenSnapshot};
use crate::domain::{QueuePolicy, QueueToken, TokenStatus, UserId};

use super::{checkout_message, RedisPool};

const WAITING_KEY: &str = "queue:waiting";
const ACTIVE_KEY: &str = "queue:active";

// Admits the token when the active set has room, otherwise enqueues it.
// One script keeps the capacity check and the membership write atomic
// against concurrent issues and the promotion worker.
const ADMIT_OR_ENQUEUE_SCRIPT: &str = r#"
if redis.call('SCARD', KEYS[1]) < tonumber(ARGV[2]) then
    redis.call('SADD', KEYS[1], ARGV[1])
    return 1
end
redis.call('ZADD', KEYS[2], ARGV[3], ARGV[1])
return 0
"#;

fn token_key(token: &QueueToken) -> String {
    format!("queue:token:{token}")
}

fn user_key(user_id: UserId) -> String {
    format!("queue:user:{user_id}")
}

fn map_redis_error(error: bb8_redis::redis::RedisError) -> QueueStoreError {
    QueueStoreError::backend(error.to_string())
}

/// Redis-backed implementation of the queue store port.
#[derive(Clone)]
pub struct RedisQueueStore {
    pool: RedisPool,
    policy: QueuePolicy,
}

impl RedisQueueStore {
    /// Create a store with the default admission policy.
    pub fn new(pool: RedisPool) -> Self {
        Self::with_policy(pool, QueuePolicy::default())
    }

    /// Create a store with an explicit admission policy.
    pub fn with_policy(pool: RedisPool, policy: QueuePolicy) -> Self {
        Self { pool, policy }
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, bb8_redis::RedisConnectionManager>, QueueStoreError>
    {
        self.pool
            .get()
            .await
            .map_err(|err| QueueStoreError::backend(checkout_message(err)))
    }

    fn token_ttl_secs(&self) -> u64 {
        self.policy.token_ttl.as_secs()
    }
}

#[async_trait]
impl QueueStore for RedisQueueStore {
    async fn issue(&self, user_id: UserId) -> Result<IssuedToken, QueueStoreError> {
        let mut conn = self.connection().await?;

        // Re-issue the user's existing token while it is still alive.
        let existing: Option<String> = conn.get(user_key(user_id)).await.map_err(map_redis_error)?;
        if let Some(raw) = existing {
            let token = QueueToken::from_raw(raw);
            let status: Option<String> = conn
                .hget(token_key(&token), "status")
                .await
                .map_err(map_redis_error)?;
            if let Some(status) = status.as_deref().and_then(TokenStatus::parse) {
                return Ok(IssuedToken { token, status });
            }
        }

        let token = QueueToken::generate();
        let admitted: i64 = Script::new(ADMIT_OR_ENQUEUE_SCRIPT)
            .key(ACTIVE_KEY)
            .key(WAITING_KEY)
            .arg(token.as_str())
            .arg(self.policy.max_active_users)
            .arg(Utc::now().timestamp_millis())
            .invoke_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;
        let status = if admitted == 1 {
            TokenStatus::Active
        } else {
            TokenStatus::Waiting
        };

        let key = token_key(&token);
        let _: () = conn
            .hset_multiple(
                &key,
                &[
                    ("user_id", user_id.to_string()),
                    ("status", status.as_str().to_owned()),
                ],
            )
            .await
            .map_err(map_redis_error)?;
        let _: () = conn
            .expire(&key, self.token_ttl_secs() as i64)
            .await
            .map_err(map_redis_error)?;
        let _: () = conn
            .set_ex(user_key(user_id), token.as_str(), self.token_ttl_secs())
            .await
            .map_err(map_redis_error)?;

        Ok(IssuedToken { token, status })
    }

    async fn snapshot(&self, token: &QueueToken) -> Result<Option<TokenSnapshot>, QueueStoreError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, String> = conn
            .hgetall(token_key(token))
            .await
            .map_err(map_redis_error)?;
        if fields.is_empty() {
            return Ok(None);
        }

        let status = fields
            .get("status")
            .and_then(|raw| TokenStatus::parse(raw))
            .unwrap_or(TokenStatus::Pending);
        let user_id = fields
            .get("user_id")
            .and_then(|raw| UserId::parse(raw).ok());
        let waiting_position = if status == TokenStatus::Waiting {
            let rank: Option<u64> = conn
                .zrank(WAITING_KEY, token.as_str())
                .await
                .map_err(map_redis_error)?;
            rank.map(|rank| rank + 1)
        } else {
            None
        };

        Ok(Some(TokenSnapshot {
            status,
            user_id,
            waiting_position,
        }))
    }

    async fn expire(&self, token: &QueueToken) -> Result<(), QueueStoreError> {
        let mut conn = self.connection().await?;
        let key = token_key(token);
        let owner: Option<String> = conn.hget(&key, "user_id").await.map_err(map_redis_error)?;

        let _: () = conn
            .zrem(WAITING_KEY, token.as_str())
            .await
            .map_err(map_redis_error)?;
        let _: () = conn
            .srem(ACTIVE_KEY, token.as_str())
            .await
            .map_err(map_redis_error)?;
        let _: () = conn.del(&key).await.map_err(map_redis_error)?;
        if let Some(owner) = owner.as_deref().and_then(|raw| UserId::parse(raw).ok()) {
            let _: () = conn.del(user_key(owner)).await.map_err(map_redis_error)?;
        }
        Ok(())
    }

    async fn counts(&self) -> Result<QueueCounts, QueueStoreError> {
        let mut conn = self.connection().await?;
        let active: u64 = conn.scard(ACTIVE_KEY).await.map_err(map_redis_error)?;
        let waiting: u64 = conn.zcard(WAITING_KEY).await.map_err(map_redis_error)?;
        Ok(QueueCounts { active, waiting })
    }

    async fn activate_next(&self, count: u32) -> Result<u32, QueueStoreError> {
        if count == 0 {
            return Ok(0);
        }
        let mut conn = self.connection().await?;
        let popped: Vec<(String, f64)> = conn
            .zpopmin(WAITING_KEY, count as isize)
            .await
            .map_err(map_redis_error)?;

        let mut activated = 0;
        for (raw, _enqueued_ms) in popped {
            let token = QueueToken::from_raw(raw);
            let key = token_key(&token);
            // A token whose info hash expired while waiting is dead;
            // promoting it would recreate the hash without a user and
            // pin an unusable slot in the active set.
            let alive: bool = conn.exists(&key).await.map_err(map_redis_error)?;
            if !alive {
                continue;
            }
            let _: () = conn
                .sadd(ACTIVE_KEY, token.as_str())
                .await
                .map_err(map_redis_error)?;
            let _: () = conn
                .hset(&key, "status", TokenStatus::Active.as_str())
                .await
                .map_err(map_redis_error)?;
            // Activation restarts the TTL so a long wait does not eat into
            // the user's booking window.
            let _: () = conn
                .expire(&key, self.token_ttl_secs() as i64)
                .await
                .map_err(map_redis_error)?;
            activated += 1;
        }
        Ok(activated)
    }

    async fn purge_missing(&self) -> Result<u64, QueueStoreError> {
        let mut conn = self.connection().await?;
        let mut swept = 0;

        let active: Vec<String> = conn.smembers(ACTIVE_KEY).await.map_err(map_redis_error)?;
        for raw in active {
            let token = QueueToken::from_raw(raw);
            let alive: bool = conn
                .exists(token_key(&token))
                .await
                .map_err(map_redis_error)?;
            if !alive {
                let _: () = conn
                    .srem(ACTIVE_KEY, token.as_str())
                    .await
                    .map_err(map_redis_error)?;
                swept += 1;
            }
        }

        let waiting: Vec<String> = conn
            .zrange(WAITING_KEY, 0, -1)
            .await
            .map_err(map_redis_error)?;
        for raw in waiting {
            let token = QueueToken::from_raw(raw);
            let alive: bool = conn
                .exists(token_key(&token))
                .await
                .map_err(map_redis_error)?;
            if !alive {
                let _: () = conn
                    .zrem(WAITING_KEY, token.as_str())
                    .await
                    .map_err(map_redis_error)?;
                swept += 1;
            }
        }

        Ok(swept)
    }
}
