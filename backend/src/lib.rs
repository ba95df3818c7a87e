//! Concert ticketing backend library modules.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod version;
pub mod workers;

pub use middleware::trace::Trace;
