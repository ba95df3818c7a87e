//! Driving port for browsing concerts, schedules, and seat availability.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::concert::ConcertId;
use crate::domain::Error;

/// Concert listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConcertSummary {
    pub id: i64,
    pub title: String,
}

/// Schedule listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePayload {
    pub id: i64,
    pub concert_id: i64,
    pub date: NaiveDate,
    pub total_seats: i32,
}

/// Seat numbers still open for a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSeatsResponse {
    pub schedule_id: i64,
    pub date: NaiveDate,
    pub available_seats: Vec<i32>,
}

/// Driving port for read-only catalogue queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalogue: Send + Sync {
    /// All concerts on sale.
    async fn list_concerts(&self) -> Result<Vec<ConcertSummary>, Error>;

    /// Schedules for one concert.
    async fn list_schedules(&self, concert_id: ConcertId) -> Result<Vec<SchedulePayload>, Error>;

    /// Seats neither held nor confirmed for the schedule on `date`.
    async fn available_seats(
        &self,
        concert_id: ConcertId,
        date: NaiveDate,
    ) -> Result<AvailableSeatsResponse, Error>;
}

/// Fixture catalogue with a single concert and a fully open house.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogue;

#[async_trait]
impl Catalogue for FixtureCatalogue {
    async fn list_concerts(&self) -> Result<Vec<ConcertSummary>, Error> {
        Ok(vec![ConcertSummary {
            id: 1,
            title: "Fixture concert".to_owned(),
        }])
    }

    async fn list_schedules(&self, concert_id: ConcertId) -> Result<Vec<SchedulePayload>, Error> {
        Ok(vec![SchedulePayload {
            id: 1,
            concert_id: concert_id.0,
            date: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap_or_default(),
            total_seats: 50,
        }])
    }

    async fn available_seats(
        &self,
        _concert_id: ConcertId,
        date: NaiveDate,
    ) -> Result<AvailableSeatsResponse, Error> {
        Ok(AvailableSeatsResponse {
            schedule_id: 1,
            date,
            available_seats: (1..=50).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_lists_one_concert() {
        let catalogue = FixtureCatalogue;
        let concerts = catalogue.list_concerts().await.expect("list succeeds");
        assert_eq!(concerts.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_offers_every_seat() {
        let catalogue = FixtureCatalogue;
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date");
        let seats = catalogue
            .available_seats(ConcertId(1), date)
            .await
            .expect("seats query succeeds");
        assert_eq!(seats.available_seats.len(), 50);
        assert_eq!(seats.date, date);
    }
}
