//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data`, so they depend only
//! on the driving ports and stay testable without Redis or PostgreSQL.

use std::sync::Arc;

use crate::domain::ports::{
    Admission, Booking, Catalogue, FixtureAdmission, FixtureBooking, FixtureCatalogue,
    FixtureRankingQuery, FixtureWalletAccount, RankingQuery, WalletAccount,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub admission: Arc<dyn Admission>,
    pub booking: Arc<dyn Booking>,
    pub catalogue: Arc<dyn Catalogue>,
    pub rankings: Arc<dyn RankingQuery>,
    pub wallet: Arc<dyn WalletAccount>,
}

impl HttpState {
    /// Construct state from the full set of driving ports.
    pub fn new(
        admission: Arc<dyn Admission>,
        booking: Arc<dyn Booking>,
        catalogue: Arc<dyn Catalogue>,
        rankings: Arc<dyn RankingQuery>,
        wallet: Arc<dyn WalletAccount>,
    ) -> Self {
        Self {
            admission,
            booking,
            catalogue,
            rankings,
            wallet,
        }
    }

    /// State wired entirely to fixtures, for handler tests.
    pub fn fixtures() -> Self {
        Self::new(
            Arc::new(FixtureAdmission),
            Arc::new(FixtureBooking),
            Arc::new(FixtureCatalogue),
            Arc::new(FixtureRankingQuery),
            Arc::new(FixtureWalletAccount),
        )
    }
}
