//! PostgreSQL-backed `ReservationRepository` implementation using Diesel ORM.
//!
//! The partial unique index on confirmed seats is the last line of defence
//! against double booking; a unique violation on insert surfaces as
//! `DuplicateSeat` so the booking service can refund the payment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ReservationRepository, ReservationRepositoryError};
use crate::domain::reservation::{Reservation, ReservationStatus, SeatIdentifier, SeatNumber};
use crate::domain::{Money, ScheduleId, UserId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewReservationRow, ReservationRow};
use super::pool::{DbPool, PoolError};
use super::schema::reservations;

/// Diesel-backed implementation of the reservation repository port.
#[derive(Clone)]
pub struct DieselReservationRepository {
    pool: DbPool,
}

impl DieselReservationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReservationRepositoryError {
    map_basic_pool_error(error, ReservationRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ReservationRepositoryError {
    map_basic_diesel_error(
        error,
        ReservationRepositoryError::query,
        ReservationRepositoryError::connection,
    )
}

/// Insert-specific mapping that recognises the confirmed-seat index.
fn map_insert_error(error: diesel::result::Error, seat: SeatIdentifier) -> ReservationRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ReservationRepositoryError::duplicate_seat(seat.to_string())
        }
        other => map_diesel_error(other),
    }
}

/// Convert a database row into a domain reservation.
fn row_to_reservation(row: ReservationRow) -> Result<Reservation, ReservationRepositoryError> {
    let status = ReservationStatus::parse(&row.status).ok_or_else(|| {
        ReservationRepositoryError::query(format!("unknown reservation status {}", row.status))
    })?;
    let seat_number = SeatNumber::new(row.seat_number)
        .map_err(|err| ReservationRepositoryError::query(err.to_string()))?;
    let price =
        Money::new(row.price).map_err(|err| ReservationRepositoryError::query(err.to_string()))?;

    Ok(Reservation {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        seat: SeatIdentifier::new(ScheduleId(row.schedule_id), seat_number),
        price,
        status,
        reserved_at: row.reserved_at,
    })
}

#[async_trait]
impl ReservationRepository for DieselReservationRepository {
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReservationRow {
            id: reservation.id,
            user_id: *reservation.user_id.as_uuid(),
            schedule_id: reservation.seat.schedule_id.0,
            seat_number: reservation.seat.seat_number.value(),
            price: reservation.price.amount(),
            status: reservation.status.as_str(),
            reserved_at: reservation.reserved_at,
        };

        diesel::insert_into(reservations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, reservation.seat))?;
        Ok(())
    }

    async fn find_by_id(
        &self,
        reservation_id: &Uuid,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReservationRow> = reservations::table
            .find(reservation_id)
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn find_confirmed(
        &self,
        seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReservationRow> = reservations::table
            .filter(reservations::schedule_id.eq(seat.schedule_id.0))
            .filter(reservations::seat_number.eq(seat.seat_number.value()))
            .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn find_temporary(
        &self,
        seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ReservationRow> = reservations::table
            .filter(reservations::schedule_id.eq(seat.schedule_id.0))
            .filter(reservations::seat_number.eq(seat.seat_number.value()))
            .filter(reservations::status.eq(ReservationStatus::TemporaryAssigned.as_str()))
            .order_by(reservations::reserved_at.desc())
            .select(ReservationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_reservation).transpose()
    }

    async fn confirmed_seats(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let seats: Vec<i32> = reservations::table
            .filter(reservations::schedule_id.eq(schedule_id.0))
            .filter(reservations::status.eq(ReservationStatus::Confirmed.as_str()))
            .select(reservations::seat_number)
            .order_by(reservations::seat_number.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(seats
            .into_iter()
            .filter_map(|value| SeatNumber::new(value).ok())
            .collect())
    }

    async fn update_status(
        &self,
        reservation_id: &Uuid,
        status: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(reservations::table.find(reservation_id))
            .set(reservations::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(ReservationRepositoryError::query(format!(
                "reservation {reservation_id} not found"
            )));
        }
        Ok(())
    }

    async fn expire_overdue(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let expired = diesel::update(
            reservations::table
                .filter(reservations::status.eq(ReservationStatus::TemporaryAssigned.as_str()))
                .filter(reservations::reserved_at.lt(cutoff)),
        )
        .set(reservations::status.eq(ReservationStatus::Expired.as_str()))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(expired as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(status: &str) -> ReservationRow {
        ReservationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            schedule_id: 5,
            seat_number: 12,
            price: 80_000,
            status: status.to_owned(),
            reserved_at: Utc::now(),
        }
    }

    #[rstest]
    fn rows_convert_to_domain_reservations() {
        let converted = row_to_reservation(row("CONFIRMED")).expect("valid row converts");
        assert_eq!(converted.status, ReservationStatus::Confirmed);
        assert_eq!(converted.seat.schedule_id, ScheduleId(5));
        assert_eq!(converted.seat.seat_number.value(), 12);
        assert_eq!(converted.price.amount(), 80_000);
    }

    #[rstest]
    #[case("BOOKED")]
    #[case("")]
    fn unknown_status_is_rejected(#[case] status: &str) {
        assert!(row_to_reservation(row(status)).is_err());
    }

    #[rstest]
    fn unique_violations_map_to_duplicate_seat() {
        let seat = SeatIdentifier::new(ScheduleId(5), SeatNumber::new(12).expect("valid seat"));
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );
        let mapped = map_insert_error(error, seat);
        assert!(matches!(
            mapped,
            ReservationRepositoryError::DuplicateSeat { .. }
        ));
    }
}
