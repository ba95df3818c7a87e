//! Driven port for publishing reservation lifecycle events.

use crate::domain::events::ReservationEvent;

/// Fire-and-forget publisher for reservation events.
///
/// Publishing must never fail the commercial transaction that produced
/// the event; adapters log and drop on backpressure instead of erroring.
#[cfg_attr(test, mockall::automock)]
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: ReservationEvent);
}

/// Publisher that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopEventPublisher;

impl EventPublisher for NoopEventPublisher {
    fn publish(&self, _event: ReservationEvent) {}
}
