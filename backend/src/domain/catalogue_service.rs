//! Catalogue domain service.
//!
//! Read-only queries over concerts and schedules, plus seat availability
//! computed as the schedule's seat range minus confirmed reservations and
//! live holds.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::concert::ConcertId;
use crate::domain::ports::{
    AvailableSeatsResponse, Catalogue, ConcertRepository, ConcertRepositoryError, ConcertSummary,
    ReservationRepository, ReservationRepositoryError, SchedulePayload, SeatHoldStore,
    SeatHoldStoreError,
};
use crate::domain::Error;

fn map_concert_error(error: ConcertRepositoryError) -> Error {
    match error {
        ConcertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("concert repository unavailable: {message}"))
        }
        ConcertRepositoryError::Query { message } => {
            Error::internal(format!("concert repository error: {message}"))
        }
    }
}

fn map_reservation_error(error: ReservationRepositoryError) -> Error {
    match error {
        ReservationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reservation repository unavailable: {message}"))
        }
        ReservationRepositoryError::Query { message }
        | ReservationRepositoryError::DuplicateSeat { message } => {
            Error::internal(format!("reservation repository error: {message}"))
        }
    }
}

fn map_hold_error(error: SeatHoldStoreError) -> Error {
    match error {
        SeatHoldStoreError::Backend { message } => {
            Error::service_unavailable(format!("seat hold store unavailable: {message}"))
        }
    }
}

/// Catalogue service backed by the concert and reservation stores.
#[derive(Clone)]
pub struct CatalogueService<C, R, H> {
    concert_repo: Arc<C>,
    reservation_repo: Arc<R>,
    seat_holds: Arc<H>,
}

impl<C, R, H> CatalogueService<C, R, H> {
    /// Create a new catalogue service.
    pub fn new(concert_repo: Arc<C>, reservation_repo: Arc<R>, seat_holds: Arc<H>) -> Self {
        Self {
            concert_repo,
            reservation_repo,
            seat_holds,
        }
    }
}

#[async_trait]
impl<C, R, H> Catalogue for CatalogueService<C, R, H>
where
    C: ConcertRepository,
    R: ReservationRepository,
    H: SeatHoldStore,
{
    async fn list_concerts(&self) -> Result<Vec<ConcertSummary>, Error> {
        let concerts = self
            .concert_repo
            .list_concerts()
            .await
            .map_err(map_concert_error)?;

        Ok(concerts
            .into_iter()
            .map(|concert| ConcertSummary {
                id: concert.id.0,
                title: concert.title,
            })
            .collect())
    }

    async fn list_schedules(&self, concert_id: ConcertId) -> Result<Vec<SchedulePayload>, Error> {
        let schedules = self
            .concert_repo
            .list_schedules(concert_id)
            .await
            .map_err(map_concert_error)?;

        Ok(schedules
            .into_iter()
            .map(|schedule| SchedulePayload {
                id: schedule.id.0,
                concert_id: schedule.concert_id.0,
                date: schedule.date,
                total_seats: schedule.total_seats,
            })
            .collect())
    }

    async fn available_seats(
        &self,
        concert_id: ConcertId,
        date: NaiveDate,
    ) -> Result<AvailableSeatsResponse, Error> {
        let schedule = self
            .concert_repo
            .find_schedule_by_date(concert_id, date)
            .await
            .map_err(map_concert_error)?
            .ok_or_else(|| {
                Error::not_found(format!("no schedule for concert {concert_id} on {date}"))
            })?;

        let confirmed = self
            .reservation_repo
            .confirmed_seats(schedule.id)
            .await
            .map_err(map_reservation_error)?;
        let held = self
            .seat_holds
            .held_seats(schedule.id)
            .await
            .map_err(map_hold_error)?;

        let taken: BTreeSet<i32> = confirmed
            .into_iter()
            .chain(held)
            .map(|seat| seat.value())
            .collect();

        let available_seats = (1..=schedule.total_seats)
            .filter(|seat| !taken.contains(seat))
            .collect();

        Ok(AvailableSeatsResponse {
            schedule_id: schedule.id.0,
            date: schedule.date,
            available_seats,
        })
    }
}

#[cfg(test)]
#[path = "catalogue_service_tests.rs"]
mod tests;
