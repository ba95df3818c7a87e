//! PostgreSQL-backed `ConcertRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ConcertRepository, ConcertRepositoryError};
use crate::domain::{Concert, ConcertId, ConcertSchedule, ScheduleId};

use super::diesel_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{ConcertRow, ScheduleRow};
use super::pool::{DbPool, PoolError};
use super::schema::{concert_schedules, concerts};

/// Diesel-backed implementation of the concert repository port.
#[derive(Clone)]
pub struct DieselConcertRepository {
    pool: DbPool,
}

impl DieselConcertRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ConcertRepositoryError {
    map_basic_pool_error(error, ConcertRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ConcertRepositoryError {
    map_basic_diesel_error(
        error,
        ConcertRepositoryError::query,
        ConcertRepositoryError::connection,
    )
}

fn row_to_concert(row: ConcertRow) -> Concert {
    Concert {
        id: ConcertId(row.id),
        title: row.title,
    }
}

fn row_to_schedule(row: ScheduleRow) -> ConcertSchedule {
    ConcertSchedule {
        id: ScheduleId(row.id),
        concert_id: ConcertId(row.concert_id),
        date: row.performance_date,
        total_seats: row.total_seats,
    }
}

#[async_trait]
impl ConcertRepository for DieselConcertRepository {
    async fn list_concerts(&self) -> Result<Vec<Concert>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ConcertRow> = concerts::table
            .select(ConcertRow::as_select())
            .order_by(concerts::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_concert).collect())
    }

    async fn list_schedules(
        &self,
        concert_id: ConcertId,
    ) -> Result<Vec<ConcertSchedule>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<ScheduleRow> = concert_schedules::table
            .filter(concert_schedules::concert_id.eq(concert_id.0))
            .select(ScheduleRow::as_select())
            .order_by(concert_schedules::performance_date.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(row_to_schedule).collect())
    }

    async fn find_schedule(
        &self,
        schedule_id: ScheduleId,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ScheduleRow> = concert_schedules::table
            .find(schedule_id.0)
            .select(ScheduleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_schedule))
    }

    async fn find_schedule_by_date(
        &self,
        concert_id: ConcertId,
        date: NaiveDate,
    ) -> Result<Option<ConcertSchedule>, ConcertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ScheduleRow> = concert_schedules::table
            .filter(concert_schedules::concert_id.eq(concert_id.0))
            .filter(concert_schedules::performance_date.eq(date))
            .select(ScheduleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn rows_convert_to_domain_types() {
        let concert = row_to_concert(ConcertRow {
            id: 3,
            title: "Winter Gala".to_owned(),
            created_at: chrono::Utc::now(),
        });
        assert_eq!(concert.id, ConcertId(3));
        assert_eq!(concert.title, "Winter Gala");

        let schedule = row_to_schedule(ScheduleRow {
            id: 7,
            concert_id: 3,
            performance_date: NaiveDate::from_ymd_opt(2025, 12, 24).expect("valid date"),
            total_seats: 50,
        });
        assert_eq!(schedule.id, ScheduleId(7));
        assert_eq!(schedule.concert_id, ConcertId(3));
        assert_eq!(schedule.total_seats, 50);
    }
}
