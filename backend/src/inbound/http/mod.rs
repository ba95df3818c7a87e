//! HTTP inbound adapter exposing REST endpoints.

pub mod concerts;
pub mod error;
pub mod health;
pub mod meta;
pub mod queue;
pub mod queue_token;
pub mod rankings;
pub mod reservations;
pub mod state;
pub mod wallet;

pub use error::ApiResult;
