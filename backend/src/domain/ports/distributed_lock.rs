//! Driven port for a Redis-style distributed lock.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::reservation::SeatIdentifier;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by distributed lock adapters.
    pub enum LockError {
        /// The lock stayed contended for the whole retry budget.
        Contended { key: String, attempts: u32 } =>
            "failed to acquire lock {key} after {attempts} attempts",
        /// The backing store is unreachable or misbehaving.
        Backend { message: String } =>
            "lock backend error: {message}",
    }
}

/// Proof of lock ownership, required to release.
///
/// The owner string is a random value written with the key; release only
/// deletes the key when the stored value still matches, so an expired
/// lock re-acquired by someone else is never stolen back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockLease {
    pub key: String,
    pub owner: String,
}

/// Key for the per-seat lock guarding hold/confirm critical sections.
pub fn seat_lock_key(seat: SeatIdentifier) -> String {
    format!("lock:reservation:seat:{seat}")
}

/// Key for the queue promotion lock.
pub const QUEUE_ACTIVATION_LOCK_KEY: &str = "lock:queue:activate";

/// Port for mutual exclusion across backend instances.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Acquire the lock, retrying up to `retries` times with `retry_delay`
    /// (plus jitter) between attempts.
    async fn acquire(
        &self,
        key: &str,
        ttl: Duration,
        retries: u32,
        retry_delay: Duration,
    ) -> Result<LockLease, LockError>;

    /// Release the lease; `false` when it already expired or changed owner.
    async fn release(&self, lease: &LockLease) -> Result<bool, LockError>;
}

/// Fixture lock: always grants, release always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureDistributedLock;

#[async_trait]
impl DistributedLock for FixtureDistributedLock {
    async fn acquire(
        &self,
        key: &str,
        _ttl: Duration,
        _retries: u32,
        _retry_delay: Duration,
    ) -> Result<LockLease, LockError> {
        Ok(LockLease {
            key: key.to_owned(),
            owner: "fixture".to_owned(),
        })
    }

    async fn release(&self, _lease: &LockLease) -> Result<bool, LockError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::concert::ScheduleId;
    use crate::domain::reservation::SeatNumber;
    use rstest::rstest;

    #[rstest]
    fn seat_lock_key_embeds_schedule_and_seat() {
        let seat = SeatIdentifier::new(ScheduleId(42), SeatNumber::new(7).expect("valid seat"));
        assert_eq!(seat_lock_key(seat), "lock:reservation:seat:42:7");
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_grants_and_releases() {
        let lock = FixtureDistributedLock;
        let lease = lock
            .acquire("lock:test", Duration::from_secs(10), 3, Duration::from_millis(100))
            .await
            .expect("fixture grants");
        assert_eq!(lease.key, "lock:test");
        assert!(lock.release(&lease).await.expect("release succeeds"));
    }

    #[rstest]
    fn contended_error_reports_attempts() {
        let err = LockError::contended("lock:seat", 3_u32);
        assert_eq!(err.to_string(), "failed to acquire lock lock:seat after 3 attempts");
    }
}
