//! Tests for the catalogue service.

use std::sync::Arc;

use super::*;
use crate::domain::concert::{Concert, ConcertSchedule, ScheduleId};
use crate::domain::ports::{
    MockConcertRepository, MockReservationRepository, MockSeatHoldStore,
};
use crate::domain::reservation::SeatNumber;
use crate::domain::ErrorCode;

fn schedule() -> ConcertSchedule {
    ConcertSchedule {
        id: ScheduleId(10),
        concert_id: ConcertId(1),
        date: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
        total_seats: 5,
    }
}

fn seats(numbers: &[i32]) -> Vec<SeatNumber> {
    numbers
        .iter()
        .map(|n| SeatNumber::new(*n).expect("valid seat"))
        .collect()
}

#[tokio::test]
async fn list_concerts_maps_to_summaries() {
    let mut concerts = MockConcertRepository::new();
    concerts.expect_list_concerts().return_once(|| {
        Ok(vec![Concert {
            id: ConcertId(3),
            title: "Midnight run".to_owned(),
        }])
    });

    let service = CatalogueService::new(
        Arc::new(concerts),
        Arc::new(MockReservationRepository::new()),
        Arc::new(MockSeatHoldStore::new()),
    );

    let summaries = service.list_concerts().await.expect("list succeeds");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, 3);
    assert_eq!(summaries[0].title, "Midnight run");
}

#[tokio::test]
async fn available_seats_excludes_confirmed_and_held() {
    let mut concerts = MockConcertRepository::new();
    concerts
        .expect_find_schedule_by_date()
        .return_once(|_, _| Ok(Some(schedule())));

    let mut reservations = MockReservationRepository::new();
    reservations
        .expect_confirmed_seats()
        .return_once(|_| Ok(seats(&[1, 3])));

    let mut holds = MockSeatHoldStore::new();
    holds.expect_held_seats().return_once(|_| Ok(seats(&[4])));

    let service = CatalogueService::new(Arc::new(concerts), Arc::new(reservations), Arc::new(holds));

    let response = service
        .available_seats(ConcertId(1), schedule().date)
        .await
        .expect("availability succeeds");

    assert_eq!(response.schedule_id, 10);
    assert_eq!(response.available_seats, vec![2, 5]);
}

#[tokio::test]
async fn available_seats_requires_a_schedule_on_that_date() {
    let mut concerts = MockConcertRepository::new();
    concerts
        .expect_find_schedule_by_date()
        .return_once(|_, _| Ok(None));

    let service = CatalogueService::new(
        Arc::new(concerts),
        Arc::new(MockReservationRepository::new()),
        Arc::new(MockSeatHoldStore::new()),
    );

    let error = service
        .available_seats(ConcertId(1), NaiveDate::from_ymd_opt(2026, 1, 1).expect("date"))
        .await
        .expect_err("missing schedule");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn repository_outage_maps_to_service_unavailable() {
    let mut concerts = MockConcertRepository::new();
    concerts
        .expect_list_concerts()
        .return_once(|| Err(ConcertRepositoryError::connection("pool exhausted")));

    let service = CatalogueService::new(
        Arc::new(concerts),
        Arc::new(MockReservationRepository::new()),
        Arc::new(MockSeatHoldStore::new()),
    );

    let error = service.list_concerts().await.expect_err("outage");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
