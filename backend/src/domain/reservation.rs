//! Seat, hold, and reservation domain types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::concert::ScheduleId;
use super::money::Money;
use super::user::UserId;

/// Validated seat number within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatNumber(i32);

/// Raised when a seat number falls outside the venue layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("seat number must be between {min} and {max}, got {value}")]
pub struct InvalidSeatNumber {
    value: i32,
    min: i32,
    max: i32,
}

impl SeatNumber {
    /// Lowest valid seat number.
    pub const MIN: i32 = 1;
    /// Highest valid seat number.
    pub const MAX: i32 = 50;

    /// Validate and wrap a seat number.
    pub fn new(value: i32) -> Result<Self, InvalidSeatNumber> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(InvalidSeatNumber {
                value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value))
    }

    /// The raw seat number.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique seat reference: schedule plus seat number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeatIdentifier {
    pub schedule_id: ScheduleId,
    pub seat_number: SeatNumber,
}

impl SeatIdentifier {
    /// Construct from parts.
    pub fn new(schedule_id: ScheduleId, seat_number: SeatNumber) -> Self {
        Self {
            schedule_id,
            seat_number,
        }
    }
}

impl std::fmt::Display for SeatIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.schedule_id, self.seat_number)
    }
}

/// Lifecycle state of a reservation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Seat claimed, payment pending inside the hold window.
    TemporaryAssigned,
    /// Paid and final.
    Confirmed,
    /// Released after confirmation (refunded).
    Cancelled,
    /// Hold window elapsed without payment.
    Expired,
}

impl ReservationStatus {
    /// Store representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TemporaryAssigned => "TEMPORARY_ASSIGNED",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Parse the store representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "TEMPORARY_ASSIGNED" => Some(Self::TemporaryAssigned),
            "CONFIRMED" => Some(Self::Confirmed),
            "CANCELLED" => Some(Self::Cancelled),
            "EXPIRED" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// A confirmed (or in-flight) seat reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: UserId,
    pub seat: SeatIdentifier,
    pub price: Money,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
}

/// Transition errors raised by [`Reservation`] state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationTransitionError {
    #[error("reservation is not confirmed, current status {status}")]
    NotConfirmed { status: &'static str },
    #[error("reservation is not pending payment, current status {status}")]
    NotPending { status: &'static str },
}

impl Reservation {
    /// Create a freshly confirmed reservation.
    pub fn confirmed(user_id: UserId, seat: SeatIdentifier, price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            seat,
            price,
            status: ReservationStatus::Confirmed,
            reserved_at: Utc::now(),
        }
    }

    /// Create a temporary assignment pending payment.
    pub fn temporary(user_id: UserId, seat: SeatIdentifier, price: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            seat,
            price,
            status: ReservationStatus::TemporaryAssigned,
            reserved_at: Utc::now(),
        }
    }

    /// Confirmed → cancelled; only confirmed reservations can be cancelled.
    pub fn cancel(&mut self) -> Result<(), ReservationTransitionError> {
        if self.status != ReservationStatus::Confirmed {
            return Err(ReservationTransitionError::NotConfirmed {
                status: self.status.as_str(),
            });
        }
        self.status = ReservationStatus::Cancelled;
        Ok(())
    }

    /// Temporary → expired; used by the cleanup worker.
    pub fn expire(&mut self) -> Result<(), ReservationTransitionError> {
        if self.status != ReservationStatus::TemporaryAssigned {
            return Err(ReservationTransitionError::NotPending {
                status: self.status.as_str(),
            });
        }
        self.status = ReservationStatus::Expired;
        Ok(())
    }
}

/// Tunables for seat holds and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservationPolicy {
    /// How long a hold shields a seat before payment.
    pub hold_ttl: Duration,
    /// Fixed seat price until dynamic pricing lands.
    pub seat_price: Money,
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self {
            hold_ttl: Duration::from_secs(5 * 60),
            seat_price: Money::from_won(80_000),
        }
    }
}
