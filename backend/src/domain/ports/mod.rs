//! Domain ports: driving use-case traits and driven store/repository traits.
//!
//! Driving ports are what the HTTP adapter calls; driven ports are what the
//! PostgreSQL and Redis adapters implement. Each driven port declares its
//! own error enum via [`macros::define_port_error`] and ships a `Fixture`
//! implementation for tests that do not exercise real I/O.

mod admission;
mod booking;
mod catalogue;
mod concert_repository;
mod distributed_lock;
mod event_publisher;
pub(crate) mod macros;
mod queue_store;
mod ranking_query;
mod ranking_store;
mod reservation_repository;
mod seat_hold_store;
mod wallet_account;
mod wallet_repository;

#[cfg(test)]
pub use admission::MockAdmission;
pub use admission::{
    Admission, FixtureAdmission, IssueTokenResponse, QueueStatusResponse, TokenStatusResponse,
};
#[cfg(test)]
pub use booking::MockBooking;
pub use booking::{
    Booking, CancelResponse, ConfirmRequest, ConfirmResponse, FixtureBooking, HoldSeatRequest,
    HoldSeatResponse,
};
#[cfg(test)]
pub use catalogue::MockCatalogue;
pub use catalogue::{
    AvailableSeatsResponse, Catalogue, ConcertSummary, FixtureCatalogue, SchedulePayload,
};
#[cfg(test)]
pub use concert_repository::MockConcertRepository;
pub use concert_repository::{ConcertRepository, ConcertRepositoryError, FixtureConcertRepository};
#[cfg(test)]
pub use distributed_lock::MockDistributedLock;
pub use distributed_lock::{
    seat_lock_key, DistributedLock, FixtureDistributedLock, LockError, LockLease,
    QUEUE_ACTIVATION_LOCK_KEY,
};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublisher, NoopEventPublisher};
#[cfg(test)]
pub use queue_store::MockQueueStore;
pub use queue_store::{
    FixtureQueueStore, IssuedToken, QueueCounts, QueueStore, QueueStoreError, TokenSnapshot,
};
#[cfg(test)]
pub use ranking_query::MockRankingQuery;
pub use ranking_query::{FixtureRankingQuery, RankingQuery};
#[cfg(test)]
pub use ranking_store::MockRankingStore;
pub use ranking_store::{FixtureRankingStore, RankingStore, RankingStoreError};
#[cfg(test)]
pub use reservation_repository::MockReservationRepository;
pub use reservation_repository::{
    FixtureReservationRepository, ReservationRepository, ReservationRepositoryError,
};
#[cfg(test)]
pub use seat_hold_store::MockSeatHoldStore;
pub use seat_hold_store::{FixtureSeatHoldStore, SeatHoldStore, SeatHoldStoreError};
#[cfg(test)]
pub use wallet_account::MockWalletAccount;
pub use wallet_account::{ChargeResponse, FixtureWalletAccount, WalletAccount};
#[cfg(test)]
pub use wallet_repository::MockWalletRepository;
pub use wallet_repository::{FixtureWalletRepository, WalletRepository, WalletRepositoryError};
