//! Domain model for the concert ticketing backend.
//!
//! Transport-agnostic entities, value types, driving and driven ports, and
//! the application services wiring them together. Inbound adapters map
//! domain errors to HTTP; outbound adapters implement the driven ports
//! against PostgreSQL and Redis.

mod admission_service;
mod booking_service;
mod catalogue_service;
pub mod concert;
pub mod error;
pub mod events;
pub mod money;
pub mod ports;
pub mod queue;
pub mod ranking;
mod ranking_service;
pub mod reservation;
pub mod user;
mod wallet_service;
pub mod wallet;

pub use admission_service::AdmissionService;
pub use booking_service::BookingService;
pub use catalogue_service::CatalogueService;
pub use concert::{Concert, ConcertId, ConcertSchedule, ScheduleId};
pub use error::{Error, ErrorCode};
pub use events::ReservationEvent;
pub use money::Money;
pub use queue::{QueuePolicy, QueueToken, TokenStatus};
pub use ranking::{RankingEntry, ScheduleStats};
pub use ranking_service::RankingService;
pub use reservation::{
    Reservation, ReservationPolicy, ReservationStatus, SeatIdentifier, SeatNumber,
};
pub use user::UserId;
pub use wallet::{LedgerEntry, LedgerEntryKind};
pub use wallet_service::WalletService;
