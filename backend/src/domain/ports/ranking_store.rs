//! Driven port for sales statistics and ranking aggregates.

use async_trait::async_trait;

use crate::domain::concert::ScheduleId;
use crate::domain::ranking::ScheduleStats;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by ranking store adapters.
    pub enum RankingStoreError {
        /// Backing store rejected or failed the command.
        Backend { message: String } =>
            "ranking store backend error: {message}",
    }
}

/// Port over the per-schedule sales counters and the velocity rankings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingStore: Send + Sync {
    /// Stats for a schedule, if any sales activity has been recorded.
    async fn stats(&self, schedule_id: ScheduleId) -> Result<Option<ScheduleStats>, RankingStoreError>;

    /// Cache the seat capacity used to detect sell-out.
    async fn cache_total_seats(
        &self,
        schedule_id: ScheduleId,
        total_seats: i64,
    ) -> Result<(), RankingStoreError>;

    /// Record when sales opened; keeps the first value on repeat calls.
    async fn set_start_time_if_absent(
        &self,
        schedule_id: ScheduleId,
        start_time_ms: i64,
    ) -> Result<(), RankingStoreError>;

    /// Bump the sold counter; returns the new count.
    async fn increment_sold(&self, schedule_id: ScheduleId) -> Result<i64, RankingStoreError>;

    /// Roll back one sale after a cancellation; returns the new count.
    async fn decrement_sold(&self, schedule_id: ScheduleId) -> Result<i64, RankingStoreError>;

    /// Mark the schedule sold out and rank it by time-to-sell-out.
    async fn record_sold_out(
        &self,
        schedule_id: ScheduleId,
        sold_out_time_ms: i64,
        seconds_to_sell_out: f64,
    ) -> Result<(), RankingStoreError>;

    /// Refresh the schedule's score in the velocity ranking.
    async fn update_velocity(
        &self,
        schedule_id: ScheduleId,
        velocity: f64,
    ) -> Result<(), RankingStoreError>;

    /// Top schedules by sales velocity, fastest first.
    async fn top_by_velocity(&self, limit: usize) -> Result<Vec<ScheduleId>, RankingStoreError>;
}

/// Fixture store that records nothing and ranks nobody.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRankingStore;

#[async_trait]
impl RankingStore for FixtureRankingStore {
    async fn stats(&self, _schedule_id: ScheduleId) -> Result<Option<ScheduleStats>, RankingStoreError> {
        Ok(None)
    }

    async fn cache_total_seats(
        &self,
        _schedule_id: ScheduleId,
        _total_seats: i64,
    ) -> Result<(), RankingStoreError> {
        Ok(())
    }

    async fn set_start_time_if_absent(
        &self,
        _schedule_id: ScheduleId,
        _start_time_ms: i64,
    ) -> Result<(), RankingStoreError> {
        Ok(())
    }

    async fn increment_sold(&self, _schedule_id: ScheduleId) -> Result<i64, RankingStoreError> {
        Ok(1)
    }

    async fn decrement_sold(&self, _schedule_id: ScheduleId) -> Result<i64, RankingStoreError> {
        Ok(0)
    }

    async fn record_sold_out(
        &self,
        _schedule_id: ScheduleId,
        _sold_out_time_ms: i64,
        _seconds_to_sell_out: f64,
    ) -> Result<(), RankingStoreError> {
        Ok(())
    }

    async fn update_velocity(
        &self,
        _schedule_id: ScheduleId,
        _velocity: f64,
    ) -> Result<(), RankingStoreError> {
        Ok(())
    }

    async fn top_by_velocity(&self, _limit: usize) -> Result<Vec<ScheduleId>, RankingStoreError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_stats() {
        let store = FixtureRankingStore;
        let stats = store.stats(ScheduleId(7)).await.expect("stats query");
        assert!(stats.is_none());
        assert!(store.top_by_velocity(10).await.expect("ranking").is_empty());
    }

    #[rstest]
    fn backend_error_carries_message() {
        let err = RankingStoreError::backend("WRONGTYPE");
        assert_eq!(err.to_string(), "ranking store backend error: WRONGTYPE");
    }
}
