//! Redis-backed adapters for the queue, seat holds, rankings, and locking.
//!
//! All adapters share one `bb8` pool of multiplexed connections. Key layouts
//! are documented in each submodule; every key carries a namespace prefix so
//! the instance can share a Redis database with other tools.

use bb8_redis::{bb8, RedisConnectionManager};

mod distributed_lock;
mod queue_store;
mod ranking_store;
mod seat_hold_store;

pub use distributed_lock::RedisDistributedLock;
pub use queue_store::RedisQueueStore;
pub use ranking_store::RedisRankingStore;
pub use seat_hold_store::RedisSeatHoldStore;

/// Shared connection pool for all Redis adapters.
pub type RedisPool = bb8::Pool<RedisConnectionManager>;

/// Errors raised while building the Redis pool.
#[derive(Debug, thiserror::Error)]
pub enum RedisPoolError {
    /// The connection URL could not be parsed.
    #[error("invalid redis url: {0}")]
    InvalidUrl(bb8_redis::redis::RedisError),
    /// The pool could not establish its initial connections.
    #[error("failed to build redis pool: {0}")]
    Build(bb8_redis::redis::RedisError),
}

/// Build a connection pool against the given Redis URL.
pub async fn build_pool(redis_url: &str, max_size: u32) -> Result<RedisPool, RedisPoolError> {
    let manager = RedisConnectionManager::new(redis_url).map_err(RedisPoolError::InvalidUrl)?;
    bb8::Pool::builder()
        .max_size(max_size)
        .build(manager)
        .await
        .map_err(RedisPoolError::Build)
}

/// Flatten a bb8 checkout error into a message for port error mapping.
pub(crate) fn checkout_message(error: bb8::RunError<bb8_redis::redis::RedisError>) -> String {
    match error {
        bb8::RunError::User(err) => err.to_string(),
        bb8::RunError::TimedOut => "redis pool checkout timed out".to_owned(),
    }
}
