//! Domain events emitted by the booking flow.
//!
//! Ranking upkeep is side-channel work: the booking service publishes an
//! event after the transaction and the ranking listener consumes it off an
//! in-process channel, so payment latency never waits on ranking writes.

use chrono::{DateTime, Utc};

use super::concert::ScheduleId;
use super::reservation::SeatIdentifier;
use super::user::UserId;
use uuid::Uuid;

/// Events published after reservation state changes commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationEvent {
    /// A reservation was paid and confirmed.
    Confirmed {
        reservation_id: Uuid,
        user_id: UserId,
        seat: SeatIdentifier,
        confirmed_at: DateTime<Utc>,
    },
    /// A confirmed reservation was cancelled and refunded.
    Cancelled {
        reservation_id: Uuid,
        user_id: UserId,
        seat: SeatIdentifier,
        cancelled_at: DateTime<Utc>,
    },
}

impl ReservationEvent {
    /// Schedule the event refers to.
    pub fn schedule_id(&self) -> ScheduleId {
        match self {
            Self::Confirmed { seat, .. } | Self::Cancelled { seat, .. } => seat.schedule_id,
        }
    }
}
