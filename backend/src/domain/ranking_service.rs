//! Fast-selling ranking domain service.
//!
//! Serves the [`RankingQuery`] driving port and applies reservation events
//! to the ranking store. Stats upkeep runs on the event listener task, off
//! the request path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::concert::ScheduleId;
use crate::domain::events::ReservationEvent;
use crate::domain::ports::{
    ConcertRepository, ConcertRepositoryError, RankingQuery, RankingStore, RankingStoreError,
};
use crate::domain::ranking::RankingEntry;
use crate::domain::Error;

/// Capacity assumed when neither the stats hash nor the catalogue knows
/// the schedule's seat count.
const DEFAULT_TOTAL_SEATS: i64 = 100;

fn map_store_error(error: RankingStoreError) -> Error {
    match error {
        RankingStoreError::Backend { message } => {
            Error::service_unavailable(format!("ranking store unavailable: {message}"))
        }
    }
}

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

/// Ranking service backed by the ranking store and the catalogue.
#[derive(Clone)]
pub struct RankingService<S, C> {
    ranking_store: Arc<S>,
    concert_repo: Arc<C>,
}

impl<S, C> RankingService<S, C> {
    /// Create a new ranking service.
    pub fn new(ranking_store: Arc<S>, concert_repo: Arc<C>) -> Self {
        Self {
            ranking_store,
            concert_repo,
        }
    }
}

impl<S, C> RankingService<S, C>
where
    S: RankingStore,
    C: ConcertRepository,
{
    /// Apply a reservation event to the sales stats and rankings.
    ///
    /// Called from the event listener task; failures are returned so the
    /// caller can log them, but they never affect the originating request.
    pub async fn apply(&self, event: &ReservationEvent) -> Result<(), Error> {
        match event {
            ReservationEvent::Confirmed {
                seat, confirmed_at, ..
            } => {
                self.record_sale(seat.schedule_id, *confirmed_at).await
            }
            ReservationEvent::Cancelled { seat, .. } => {
                self.record_cancellation(seat.schedule_id).await
            }
        }
    }

    async fn record_sale(
        &self,
        schedule_id: ScheduleId,
        confirmed_at: DateTime<Utc>,
    ) -> Result<(), Error> {
        let now_ms = confirmed_at.timestamp_millis();

        let prior = self
            .ranking_store
            .stats(schedule_id)
            .await
            .map_err(map_store_error)?
            .unwrap_or_default();
        // A sold-out schedule's stats are final.
        if prior.is_sold_out() {
            return Ok(());
        }

        self.ranking_store
            .set_start_time_if_absent(schedule_id, now_ms)
            .await
            .map_err(map_store_error)?;

        let total_seats = match prior.total_seats {
            Some(total) => i64::from(total),
            None => {
                let total = self
                    .total_seats(schedule_id)
                    .await?
                    .map(i64::from)
                    .unwrap_or(DEFAULT_TOTAL_SEATS);
                self.ranking_store
                    .cache_total_seats(schedule_id, total)
                    .await
                    .map_err(map_store_error)?;
                total
            }
        };

        let sold_count = self
            .ranking_store
            .increment_sold(schedule_id)
            .await
            .map_err(map_store_error)?;

        let stats = self
            .ranking_store
            .stats(schedule_id)
            .await
            .map_err(map_store_error)?
            .unwrap_or_default();

        if let Some(velocity) = stats.velocity_per_minute(now_ms) {
            self.ranking_store
                .update_velocity(schedule_id, velocity)
                .await
                .map_err(map_store_error)?;
        }

        if sold_count >= total_seats {
            let seconds = stats
                .start_time_ms
                .map(|start| (now_ms - start).max(0) as f64 / 1_000.0)
                .unwrap_or(0.0);
            self.ranking_store
                .record_sold_out(schedule_id, now_ms, seconds)
                .await
                .map_err(map_store_error)?;
            tracing::info!(schedule_id = %schedule_id, seconds, "schedule sold out");
        }

        Ok(())
    }

    async fn record_cancellation(&self, schedule_id: ScheduleId) -> Result<(), Error> {
        self.ranking_store
            .decrement_sold(schedule_id)
            .await
            .map_err(map_store_error)?;

        let stats = self
            .ranking_store
            .stats(schedule_id)
            .await
            .map_err(map_store_error)?
            .unwrap_or_default();

        if let Some(velocity) = stats.velocity_per_minute(Utc::now().timestamp_millis()) {
            self.ranking_store
                .update_velocity(schedule_id, velocity)
                .await
                .map_err(map_store_error)?;
        }

        Ok(())
    }

    async fn total_seats(&self, schedule_id: ScheduleId) -> Result<Option<i32>, Error> {
        let schedule = self
            .concert_repo
            .find_schedule(schedule_id)
            .await
            .map_err(map_concert_error)?;
        Ok(schedule.map(|s| s.total_seats))
    }
}

#[async_trait]
impl<S, C> RankingQuery for RankingService<S, C>
where
    S: RankingStore,
    C: ConcertRepository,
{
    async fn fast_selling(&self, limit: usize) -> Result<Vec<RankingEntry>, Error> {
        let schedule_ids = self
            .ranking_store
            .top_by_velocity(limit)
            .await
            .map_err(map_store_error)?;

        let now_ms = Utc::now().timestamp_millis();
        let mut entries = Vec::with_capacity(schedule_ids.len());
        for schedule_id in schedule_ids {
            let stats = self
                .ranking_store
                .stats(schedule_id)
                .await
                .map_err(map_store_error)?
                .unwrap_or_default();

            let sold_out_seconds = match (stats.start_time_ms, stats.sold_out_time_ms) {
                (Some(start), Some(end)) => Some((end - start).max(0) / 1_000),
                _ => None,
            };

            entries.push(RankingEntry {
                schedule_id,
                velocity: stats.velocity_per_minute(now_ms).unwrap_or(0.0),
                sold_count: stats.sold_count,
                sold_out: stats.is_sold_out(),
                sold_out_seconds,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
#[path = "ranking_service_tests.rs"]
mod tests;
