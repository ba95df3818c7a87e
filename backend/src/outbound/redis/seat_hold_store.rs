//! Redis-backed `SeatHoldStore` implementation.
//!
//! Key layout:
//!
//! - `seat:hold:{schedule}:{seat}` — holder's user id, `SET NX PX`
//! - `seat:hold:index:{schedule}` — ZSET of held seat numbers scored by
//!   expiry time (ms)
//!
//! The hold key is the source of truth; the index only exists so a whole
//! schedule's holds can be listed without scanning the keyspace. Stale
//! index members are pruned on every read.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{AsyncCommands, ExistenceCheck, SetExpiry, SetOptions};
use chrono::Utc;

use crate::domain::ports::{SeatHoldStore, SeatHoldStoreError};
use crate::domain::reservation::{SeatIdentifier, SeatNumber};
use crate::domain::{ScheduleId, UserId};

use super::{checkout_message, RedisPool};

fn hold_key(seat: SeatIdentifier) -> String {
    format!("seat:hold:{seat}")
}

fn index_key(schedule_id: ScheduleId) -> String {
    format!("seat:hold:index:{schedule_id}")
}

fn map_redis_error(error: bb8_redis::redis::RedisError) -> SeatHoldStoreError {
    SeatHoldStoreError::backend(error.to_string())
}

/// Redis-backed implementation of the seat hold port.
#[derive(Clone)]
pub struct RedisSeatHoldStore {
    pool: RedisPool,
}

impl RedisSeatHoldStore {
    /// Create a store over the shared pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        bb8_redis::bb8::PooledConnection<'_, bb8_redis::RedisConnectionManager>,
        SeatHoldStoreError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| SeatHoldStoreError::backend(checkout_message(err)))
    }
}

#[async_trait]
impl SeatHoldStore for RedisSeatHoldStore {
    async fn try_hold(
        &self,
        seat: SeatIdentifier,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<bool, SeatHoldStoreError> {
        let mut conn = self.connection().await?;
        let ttl_ms = ttl.as_millis() as u64;
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::PX(ttl_ms));

        let reply: Option<String> = conn
            .set_options(hold_key(seat), user_id.to_string(), options)
            .await
            .map_err(map_redis_error)?;
        let acquired = reply.is_some();

        if acquired {
            let expires_at_ms = Utc::now().timestamp_millis() + ttl_ms as i64;
            let _: () = conn
                .zadd(
                    index_key(seat.schedule_id),
                    seat.seat_number.value(),
                    expires_at_ms,
                )
                .await
                .map_err(map_redis_error)?;
        }
        Ok(acquired)
    }

    async fn holder(&self, seat: SeatIdentifier) -> Result<Option<UserId>, SeatHoldStoreError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn.get(hold_key(seat)).await.map_err(map_redis_error)?;
        Ok(raw.as_deref().and_then(|raw| UserId::parse(raw).ok()))
    }

    async fn is_held_by(
        &self,
        seat: SeatIdentifier,
        user_id: UserId,
    ) -> Result<bool, SeatHoldStoreError> {
        Ok(self.holder(seat).await? == Some(user_id))
    }

    async fn release(&self, seat: SeatIdentifier) -> Result<(), SeatHoldStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.del(hold_key(seat)).await.map_err(map_redis_error)?;
        let _: () = conn
            .zrem(index_key(seat.schedule_id), seat.seat_number.value())
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn held_seats(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, SeatHoldStoreError> {
        let mut conn = self.connection().await?;
        let key = index_key(schedule_id);
        let now_ms = Utc::now().timestamp_millis();

        let _: () = conn
            .zrembyscore(&key, "-inf", now_ms)
            .await
            .map_err(map_redis_error)?;
        let live: Vec<i32> = conn
            .zrange(&key, 0, -1)
            .await
            .map_err(map_redis_error)?;

        Ok(live
            .into_iter()
            .filter_map(|value| SeatNumber::new(value).ok())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn keys_embed_schedule_and_seat() {
        let seat = SeatIdentifier::new(ScheduleId(9), SeatNumber::new(3).expect("valid seat"));
        assert_eq!(hold_key(seat), "seat:hold:9:3");
        assert_eq!(index_key(ScheduleId(9)), "seat:hold:index:9");
    }
}
