//! Driven port for reservation persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::concert::ScheduleId;
use crate::domain::reservation::{Reservation, ReservationStatus, SeatIdentifier, SeatNumber};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by reservation repository adapters.
    pub enum ReservationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "reservation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "reservation repository query failed: {message}",
        /// A confirmed reservation already exists for the seat.
        DuplicateSeat { message: String } =>
            "seat already confirmed: {message}",
    }
}

/// Port for writing and reading reservation rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Persist a reservation; duplicate confirmed seats are rejected by
    /// the store's unique constraint.
    async fn insert(&self, reservation: &Reservation) -> Result<(), ReservationRepositoryError>;

    /// Find a reservation by id.
    async fn find_by_id(
        &self,
        reservation_id: &Uuid,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// The confirmed reservation occupying the seat, if any.
    async fn find_confirmed(
        &self,
        seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// The newest temporary assignment on the seat, if any.
    async fn find_temporary(
        &self,
        seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError>;

    /// Seat numbers with confirmed reservations for the schedule.
    async fn confirmed_seats(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, ReservationRepositoryError>;

    /// Update the status of an existing reservation.
    async fn update_status(
        &self,
        reservation_id: &Uuid,
        status: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError>;

    /// Expire temporary assignments reserved before `cutoff`; returns the
    /// number of rows transitioned.
    async fn expire_overdue(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationRepositoryError>;
}

/// Fixture repository with no reservations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReservationRepository;

#[async_trait]
impl ReservationRepository for FixtureReservationRepository {
    async fn insert(&self, _reservation: &Reservation) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _reservation_id: &Uuid,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(None)
    }

    async fn find_confirmed(
        &self,
        _seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(None)
    }

    async fn find_temporary(
        &self,
        _seat: SeatIdentifier,
    ) -> Result<Option<Reservation>, ReservationRepositoryError> {
        Ok(None)
    }

    async fn confirmed_seats(
        &self,
        _schedule_id: ScheduleId,
    ) -> Result<Vec<SeatNumber>, ReservationRepositoryError> {
        Ok(Vec::new())
    }

    async fn update_status(
        &self,
        _reservation_id: &Uuid,
        _status: ReservationStatus,
    ) -> Result<(), ReservationRepositoryError> {
        Ok(())
    }

    async fn expire_overdue(
        &self,
        _cutoff: DateTime<Utc>,
    ) -> Result<u64, ReservationRepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Money;
    use crate::domain::reservation::SeatNumber;
    use crate::domain::user::UserId;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_accepts_inserts_and_finds_nothing() {
        let repo = FixtureReservationRepository;
        let seat = SeatIdentifier::new(ScheduleId(1), SeatNumber::new(1).expect("valid seat"));
        let reservation =
            Reservation::confirmed(UserId::random(), seat, Money::new(80_000).expect("price"));

        repo.insert(&reservation).await.expect("insert succeeds");
        assert!(repo
            .find_by_id(&reservation.id)
            .await
            .expect("lookup succeeds")
            .is_none());
        assert!(repo
            .find_confirmed(seat)
            .await
            .expect("check succeeds")
            .is_none());
    }

    #[rstest]
    fn duplicate_seat_error_formats_message() {
        let err = ReservationRepositoryError::duplicate_seat("schedule 1 seat 7");
        assert!(err.to_string().contains("schedule 1 seat 7"));
    }
}
