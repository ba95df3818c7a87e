//! Driving port for the fast-selling ranking.

use async_trait::async_trait;

use crate::domain::ranking::RankingEntry;
use crate::domain::Error;

/// Driving port for ranking reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RankingQuery: Send + Sync {
    /// Schedules selling fastest right now, best first.
    async fn fast_selling(&self, limit: usize) -> Result<Vec<RankingEntry>, Error>;
}

/// Fixture ranking with no recorded sales.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRankingQuery;

#[async_trait]
impl RankingQuery for FixtureRankingQuery {
    async fn fast_selling(&self, _limit: usize) -> Result<Vec<RankingEntry>, Error> {
        Ok(Vec::new())
    }
}
