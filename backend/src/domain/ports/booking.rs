//! Driving port for seat holds and reservation confirmation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::concert::ScheduleId;
use crate::domain::reservation::{ReservationStatus, SeatIdentifier, SeatNumber};
use crate::domain::user::UserId;
use crate::domain::Error;

/// Request to place a temporary hold on a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldSeatRequest {
    pub schedule_id: i64,
    pub seat_number: i32,
}

/// Response to a successful seat hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HoldSeatResponse {
    pub schedule_id: i64,
    pub seat_number: i32,
    /// Amount the seat will cost on confirmation, in won.
    pub price: i64,
    pub expires_at: DateTime<Utc>,
}

/// Request to confirm a held seat by paying for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub schedule_id: i64,
    pub seat_number: i32,
    /// Ledger idempotency key for the payment; repeats replay the result.
    pub idempotency_key: Option<String>,
}

/// Response to a confirmed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub reservation_id: Uuid,
    pub schedule_id: i64,
    pub seat_number: i32,
    pub status: ReservationStatus,
    pub price: i64,
    pub balance: i64,
    pub paid_at: DateTime<Utc>,
}

/// Response to cancelling a confirmed reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    pub reservation_id: Uuid,
    pub status: ReservationStatus,
    pub refunded: i64,
}

impl HoldSeatRequest {
    /// Validate the raw identifiers into a seat.
    pub fn seat(&self) -> Result<SeatIdentifier, Error> {
        seat_from_parts(self.schedule_id, self.seat_number)
    }
}

impl ConfirmRequest {
    /// Validate the raw identifiers into a seat.
    pub fn seat(&self) -> Result<SeatIdentifier, Error> {
        seat_from_parts(self.schedule_id, self.seat_number)
    }
}

fn seat_from_parts(schedule_id: i64, seat_number: i32) -> Result<SeatIdentifier, Error> {
    let seat_number = SeatNumber::new(seat_number)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    Ok(SeatIdentifier {
        schedule_id: ScheduleId(schedule_id),
        seat_number,
    })
}

/// Driving port for the reservation flow.
///
/// All three operations require an admitted user; the HTTP adapter resolves
/// the queue token to a [`UserId`] before calling in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Booking: Send + Sync {
    /// Places a short-lived exclusive hold on a seat.
    async fn hold_seat(
        &self,
        user_id: UserId,
        request: HoldSeatRequest,
    ) -> Result<HoldSeatResponse, Error>;

    /// Pays for a held seat and confirms the reservation.
    async fn confirm(
        &self,
        user_id: UserId,
        request: ConfirmRequest,
    ) -> Result<ConfirmResponse, Error>;

    /// Cancels a confirmed reservation and refunds the payment.
    async fn cancel(
        &self,
        user_id: UserId,
        reservation_id: Uuid,
    ) -> Result<CancelResponse, Error>;
}

/// Fixture booking that holds and confirms without touching any store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBooking;

#[async_trait]
impl Booking for FixtureBooking {
    async fn hold_seat(
        &self,
        _user_id: UserId,
        request: HoldSeatRequest,
    ) -> Result<HoldSeatResponse, Error> {
        let seat = request.seat()?;
        Ok(HoldSeatResponse {
            schedule_id: seat.schedule_id.0,
            seat_number: seat.seat_number.value(),
            price: 80_000,
            expires_at: Utc::now() + chrono::Duration::minutes(5),
        })
    }

    async fn confirm(
        &self,
        _user_id: UserId,
        request: ConfirmRequest,
    ) -> Result<ConfirmResponse, Error> {
        let seat = request.seat()?;
        Ok(ConfirmResponse {
            reservation_id: Uuid::new_v4(),
            schedule_id: seat.schedule_id.0,
            seat_number: seat.seat_number.value(),
            status: ReservationStatus::Confirmed,
            price: 80_000,
            balance: 920_000,
            paid_at: Utc::now(),
        })
    }

    async fn cancel(
        &self,
        _user_id: UserId,
        reservation_id: Uuid,
    ) -> Result<CancelResponse, Error> {
        Ok(CancelResponse {
            reservation_id,
            status: ReservationStatus::Cancelled,
            refunded: 80_000,
        })
    }
}
