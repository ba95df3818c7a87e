//! Redis-backed `RankingStore` implementation.
//!
//! Key layout:
//!
//! - `ranking:stats:{schedule}` — HASH with `start_time_ms`, `sold_count`,
//!   `total_seats`, and `sold_out_time_ms` fields
//! - `ranking:velocity` — ZSET of schedules scored by seats sold per minute
//! - `ranking:soldout` — ZSET of sold-out schedules scored by seconds to
//!   sell out
//!
//! Sales counters live in Redis rather than PostgreSQL because they are
//! updated on every confirmation and read by the public rankings endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use bb8_redis::redis::{AsyncCommands, Script};

use crate::domain::ports::{RankingStore, RankingStoreError};
use crate::domain::{ScheduleId, ScheduleStats};

use super::{checkout_message, RedisPool};

const VELOCITY_KEY: &str = "ranking:velocity";
const SOLD_OUT_KEY: &str = "ranking:soldout";

// Decrements sold_count without letting it drop below zero.
const DECREMENT_SOLD_SCRIPT: &str = r#"
local count = tonumber(redis.call('HGET', KEYS[1], 'sold_count') or '0')
if count <= 0 then
    redis.call('HSET', KEYS[1], 'sold_count', 0)
    return 0
end
return redis.call('HINCRBY', KEYS[1], 'sold_count', -1)
"#;

fn stats_key(schedule_id: ScheduleId) -> String {
    format!("ranking:stats:{schedule_id}")
}

fn map_redis_error(error: bb8_redis::redis::RedisError) -> RankingStoreError {
    RankingStoreError::backend(error.to_string())
}

/// Redis-backed implementation of the ranking store port.
#[derive(Clone)]
pub struct RedisRankingStore {
    pool: RedisPool,
}

impl RedisRankingStore {
    /// Create a store over the shared pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn connection(
        &self,
    ) -> Result<
        bb8_redis::bb8::PooledConnection<'_, bb8_redis::RedisConnectionManager>,
        RankingStoreError,
    > {
        self.pool
            .get()
            .await
            .map_err(|err| RankingStoreError::backend(checkout_message(err)))
    }
}

#[async_trait]
impl RankingStore for RedisRankingStore {
    async fn stats(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Option<ScheduleStats>, RankingStoreError> {
        let mut conn = self.connection().await?;
        let fields: HashMap<String, i64> = conn
            .hgetall(stats_key(schedule_id))
            .await
            .map_err(map_redis_error)?;
        if fields.is_empty() {
            return Ok(None);
        }

        Ok(Some(ScheduleStats {
            start_time_ms: fields.get("start_time_ms").copied(),
            sold_count: fields.get("sold_count").copied().unwrap_or(0),
            total_seats: fields.get("total_seats").map(|seats| *seats as i32),
            sold_out_time_ms: fields.get("sold_out_time_ms").copied(),
        }))
    }

    async fn cache_total_seats(
        &self,
        schedule_id: ScheduleId,
        total_seats: i64,
    ) -> Result<(), RankingStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .hset(stats_key(schedule_id), "total_seats", total_seats)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn set_start_time_if_absent(
        &self,
        schedule_id: ScheduleId,
        start_time_ms: i64,
    ) -> Result<(), RankingStoreError> {
        let mut conn = self.connection().await?;
        let _: bool = conn
            .hset_nx(stats_key(schedule_id), "start_time_ms", start_time_ms)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn increment_sold(&self, schedule_id: ScheduleId) -> Result<i64, RankingStoreError> {
        let mut conn = self.connection().await?;
        conn.hincr(stats_key(schedule_id), "sold_count", 1)
            .await
            .map_err(map_redis_error)
    }

    async fn decrement_sold(&self, schedule_id: ScheduleId) -> Result<i64, RankingStoreError> {
        let mut conn = self.connection().await?;
        Script::new(DECREMENT_SOLD_SCRIPT)
            .key(stats_key(schedule_id))
            .invoke_async(&mut *conn)
            .await
            .map_err(map_redis_error)
    }

    async fn record_sold_out(
        &self,
        schedule_id: ScheduleId,
        sold_out_time_ms: i64,
        seconds_to_sell_out: f64,
    ) -> Result<(), RankingStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .hset(stats_key(schedule_id), "sold_out_time_ms", sold_out_time_ms)
            .await
            .map_err(map_redis_error)?;
        let _: () = conn
            .zadd(SOLD_OUT_KEY, schedule_id.0, seconds_to_sell_out)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn update_velocity(
        &self,
        schedule_id: ScheduleId,
        velocity: f64,
    ) -> Result<(), RankingStoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .zadd(VELOCITY_KEY, schedule_id.0, velocity)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn top_by_velocity(&self, limit: usize) -> Result<Vec<ScheduleId>, RankingStoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self.connection().await?;
        let ids: Vec<i64> = conn
            .zrevrange(VELOCITY_KEY, 0, limit as isize - 1)
            .await
            .map_err(map_redis_error)?;
        Ok(ids.into_iter().map(ScheduleId).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn stats_key_embeds_schedule() {
        assert_eq!(stats_key(ScheduleId(12)), "ranking:stats:12");
    }
}
