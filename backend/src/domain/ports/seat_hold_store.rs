//! Driven port for temporary seat holds.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::concert::ScheduleId;
use crate::domain::reservation::{SeatIdentifier, SeatNumber};
use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by seat hold store adapters.
    pub enum SeatHoldStoreError {
        /// The backing store is unreachable or misbehaving.
        Backend { message: String } =>
            "seat hold store backend error: {message}",
    }
}

/// Port for short-lived seat claims.
///
/// A hold is an atomic claim with a TTL; expiry releases the seat without
/// any cleanup on our side. The cleanup worker only handles the relational
/// reservation rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeatHoldStore: Send + Sync {
    /// Atomically claim the seat for `user_id`; `false` when already held.
    async fn try_hold(
        &self,
        seat: SeatIdentifier,
        user_id: UserId,
        ttl: Duration,
    ) -> Result<bool, SeatHoldStoreError>;

    /// Current holder of the seat, if any.
    async fn holder(&self, seat: SeatIdentifier) -> Result<Option<UserId>, SeatHoldStoreError>;

    /// Whether `user_id` currently holds the seat.
    async fn is_held_by(
        &self,
        seat: SeatIdentifier,
        user_id: UserId,
    ) -> Result<bool, SeatHoldStoreError>;

    /// Drop the hold regardless of owner.
    async fn release(&self, seat: SeatIdentifier) -> Result<(), SeatHoldStoreError>;

    /// Seat numbers of the schedule currently under a hold.
    async fn held_seats(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, SeatHoldStoreError>;
}

/// Fixture store: every claim succeeds, nothing is ever held.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSeatHoldStore;

#[async_trait]
impl SeatHoldStore for FixtureSeatHoldStore {
    async fn try_hold(
        &self,
        _seat: SeatIdentifier,
        _user_id: UserId,
        _ttl: Duration,
    ) -> Result<bool, SeatHoldStoreError> {
        Ok(true)
    }

    async fn holder(&self, _seat: SeatIdentifier) -> Result<Option<UserId>, SeatHoldStoreError> {
        Ok(None)
    }

    async fn is_held_by(
        &self,
        _seat: SeatIdentifier,
        _user_id: UserId,
    ) -> Result<bool, SeatHoldStoreError> {
        Ok(true)
    }

    async fn release(&self, _seat: SeatIdentifier) -> Result<(), SeatHoldStoreError> {
        Ok(())
    }

    async fn held_seats(
        &self,
        _schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, SeatHoldStoreError> {
        Ok(Vec::new())
    }
}
