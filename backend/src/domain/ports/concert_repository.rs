//! Driven port for the concert catalogue.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::concert::{Concert, ConcertId, ConcertSchedule, ScheduleId};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by concert repository adapters.
    pub enum ConcertRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "concert repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "concert repository query failed: {message}",
    }
}

/// Port for reading concerts and schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConcertRepository: Send + Sync {
    /// All concerts, newest first.
    async fn list_concerts(&self) -> Result<Vec<Concert>, ConcertRepositoryError>;

    /// Schedules of one concert, by date.
    async fn list_schedules(
        &self,
        concert_id: ConcertId,
    ) -> Result<Vec<ConcertSchedule>, ConcertRepositoryError>;

    /// Look up a schedule by id.
    async fn find_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError>;

    /// Look up a concert's schedule on a specific date.
    async fn find_schedule_by_date(
        &self,
        concert_id: ConcertId,
        date: NaiveDate,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError>;
}

/// Fixture repository with no catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConcertRepository;

#[async_trait]
impl ConcertRepository for FixtureConcertRepository {
    async fn list_concerts(&self) -> Result<Vec<Concert>, ConcertRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_schedules(
        &self,
        _concert_id: ConcertId,
    ) -> Result<Vec<ConcertSchedule>, ConcertRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_schedule(
        &self,
        _schedule_id: ScheduleId,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError> {
        Ok(None)
    }

    async fn find_schedule_by_date(
        &self,
        _concert_id: ConcertId,
        _date: NaiveDate,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_catalogue_is_empty() {
        let repo = FixtureConcertRepository;
        assert!(repo.list_concerts().await.expect("list succeeds").is_empty());
        assert!(repo
            .find_schedule(ScheduleId(1))
            .await
            .expect("lookup succeeds")
            .is_none());
    }
}
