//! Sales velocity and sell-out ranking types.

use serde::Serialize;
use utoipa::ToSchema;

use super::concert::ScheduleId;

/// Per-schedule sales statistics mirrored from the ranking store hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScheduleStats {
    /// Millisecond timestamp of the first confirmed sale.
    pub start_time_ms: Option<i64>,
    /// Seats sold so far.
    pub sold_count: i64,
    /// Total seats; cached from the catalogue on first use.
    pub total_seats: Option<i32>,
    /// Millisecond timestamp at which the schedule sold out.
    pub sold_out_time_ms: Option<i64>,
}

impl ScheduleStats {
    /// Whether the schedule has recorded a sell-out.
    pub fn is_sold_out(&self) -> bool {
        self.sold_out_time_ms.is_some()
    }

    /// Seats sold per minute since the first sale, at `now_ms`.
    ///
    /// Returns `None` before the first sale. Sub-second sales windows are
    /// clamped to one second so early velocity spikes stay finite.
    pub fn velocity_per_minute(&self, now_ms: i64) -> Option<f64> {
        let start = self.start_time_ms?;
        let elapsed_ms = (now_ms - start).max(1_000);
        #[allow(clippy::cast_precision_loss, reason = "ranking score tolerates f64 rounding")]
        let per_minute = self.sold_count as f64 * 60_000.0 / elapsed_ms as f64;
        Some(per_minute)
    }
}

/// One row of the fast-selling ranking.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub schedule_id: ScheduleId,
    /// Seats sold per minute since first sale.
    pub velocity: f64,
    pub sold_count: i64,
    pub sold_out: bool,
    /// Seconds from first sale to sell-out, when sold out.
    pub sold_out_seconds: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn velocity_needs_a_first_sale() {
        let stats = ScheduleStats::default();
        assert_eq!(stats.velocity_per_minute(1_000), None);
    }

    #[rstest]
    fn velocity_counts_seats_per_minute() {
        let stats = ScheduleStats {
            start_time_ms: Some(0),
            sold_count: 30,
            ..ScheduleStats::default()
        };
        // 30 seats in one minute.
        let velocity = stats.velocity_per_minute(60_000).expect("started");
        assert!((velocity - 30.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn velocity_clamps_tiny_windows() {
        let stats = ScheduleStats {
            start_time_ms: Some(0),
            sold_count: 10,
            ..ScheduleStats::default()
        };
        // 10 seats in 1ms counts as 10 seats per clamped second.
        let velocity = stats.velocity_per_minute(1).expect("started");
        assert!((velocity - 600.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn sold_out_flag_follows_timestamp() {
        let mut stats = ScheduleStats::default();
        assert!(!stats.is_sold_out());
        stats.sold_out_time_ms = Some(42);
        assert!(stats.is_sold_out());
    }
}
