//! PostgreSQL persistence adapters built on Diesel.
//!
//! This module provides the relational half of the outbound layer: the
//! concert catalogue, reservation rows, and wallet balances with their
//! append-only ledger. The admission queue, seat holds, and ranking
//! counters live in Redis instead (see [`super::redis`]).

mod diesel_concert_repository;
mod diesel_error_mapping;
mod diesel_reservation_repository;
mod diesel_wallet_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_concert_repository::DieselConcertRepository;
pub use diesel_reservation_repository::DieselReservationRepository;
pub use diesel_wallet_repository::DieselWalletRepository;
pub use pool::{DbPool, PoolError};
