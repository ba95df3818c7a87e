//! In-process reservation event channel.
//!
//! Confirmations and cancellations are published from the booking service
//! and consumed by the ranking listener worker, keeping ranking upkeep off
//! the request path. The channel is bounded; when the listener falls too
//! far behind, events are dropped and logged rather than stalling bookings.

use tokio::sync::mpsc;
use tracing::warn;

use crate::domain::ports::EventPublisher;
use crate::domain::ReservationEvent;

/// Default channel capacity before events are dropped.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Create a publisher and its matching receiver.
pub fn reservation_event_channel(
    capacity: usize,
) -> (ChannelEventPublisher, mpsc::Receiver<ReservationEvent>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (ChannelEventPublisher { sender }, receiver)
}

/// `EventPublisher` backed by a bounded tokio channel.
#[derive(Clone)]
pub struct ChannelEventPublisher {
    sender: mpsc::Sender<ReservationEvent>,
}

impl EventPublisher for ChannelEventPublisher {
    fn publish(&self, event: ReservationEvent) {
        let schedule_id = event.schedule_id();
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%schedule_id, "event channel full, dropping reservation event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(%schedule_id, "event channel closed, dropping reservation event");
            }
        }
    }
}
