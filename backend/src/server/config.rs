//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use boxoffice::domain::ports::{EventPublisher, NoopEventPublisher};
use boxoffice::domain::{QueuePolicy, ReservationPolicy};
use boxoffice::outbound::persistence::DbPool;
use boxoffice::outbound::redis::RedisPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) redis_pool: Option<RedisPool>,
    pub(crate) events: Arc<dyn EventPublisher>,
    pub(crate) queue_policy: QueuePolicy,
    pub(crate) reservation_policy: ReservationPolicy,
}

impl ServerConfig {
    /// Construct a configuration binding to the given address, with default
    /// policies and fixture-backed ports.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            db_pool: None,
            redis_pool: None,
            events: Arc::new(NoopEventPublisher),
            queue_policy: QueuePolicy::default(),
            reservation_policy: ReservationPolicy::default(),
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Real adapters are only wired when both this and the Redis pool are
    /// present; otherwise the server falls back to fixtures.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach a Redis connection pool for queue, hold, and ranking adapters.
    #[must_use]
    pub fn with_redis_pool(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Attach the reservation event publisher used by the booking service.
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn EventPublisher>) -> Self {
        self.events = events;
        self
    }

    /// Override the admission queue policy.
    #[must_use]
    pub fn with_queue_policy(mut self, policy: QueuePolicy) -> Self {
        self.queue_policy = policy;
        self
    }

    /// Override the seat hold and pricing policy.
    #[must_use]
    pub fn with_reservation_policy(mut self, policy: ReservationPolicy) -> Self {
        self.reservation_policy = policy;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
