//! Event sink capability and the bounded in-process broker.

use crossbeam_channel::{bounded, Receiver, Sender};
use std::time::Duration;

use crate::events::OracleEvent;

/// Default event buffer capacity for [`ChannelBroker`].
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Fire-and-forget sink for engine events.
///
/// The engine requires no delivery acknowledgment; implementations must
/// not block the calling thread.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn send(&self, event: OracleEvent);

    /// Deliver several events in order.
    fn send_batch(&self, events: Vec<OracleEvent>) {
        for event in events {
            self.send(event);
        }
    }
}

/// Bounded broker backed by a crossbeam channel.
///
/// At-most-once: events are dropped when the buffer is full or the
/// receiving handle is gone, so a slow event consumer never blocks the
/// engine.
pub struct ChannelBroker {
    sender: Sender<OracleEvent>,
}

impl ChannelBroker {
    /// Create a broker and the handle that drains it.
    pub fn new(capacity: usize) -> (Self, BrokerHandle) {
        let (sender, receiver) = bounded(capacity);
        (Self { sender }, BrokerHandle { receiver })
    }
}

impl EventSink for ChannelBroker {
    fn send(&self, event: OracleEvent) {
        let _ = self.sender.try_send(event);
    }
}

/// Receiving side of a [`ChannelBroker`].
pub struct BrokerHandle {
    pub receiver: Receiver<OracleEvent>,
}

impl BrokerHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<OracleEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<OracleEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<OracleEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain all currently buffered events.
    pub fn drain(&self) -> Vec<OracleEvent> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::SpecStatus;
    use crate::spec::{Filter, PropertyType, SpecDefinition};
    use crate::types::UnixTs;

    fn make_event(at: i64) -> OracleEvent {
        let definition = SpecDefinition::new(vec![Filter::new("k", PropertyType::String)]);
        OracleEvent::SpecSubscription {
            spec_id: definition.content_id().unwrap(),
            definition,
            status: SpecStatus::Active,
            activated_at: UnixTs(at),
        }
    }

    #[test]
    fn test_send_and_receive() {
        let (broker, handle) = ChannelBroker::new(DEFAULT_EVENT_CAPACITY);
        broker.send(make_event(1));

        let event = handle.try_recv().unwrap();
        assert!(matches!(
            event,
            OracleEvent::SpecSubscription {
                activated_at: UnixTs(1),
                ..
            }
        ));
    }

    #[test]
    fn test_full_buffer_drops_events() {
        let (broker, handle) = ChannelBroker::new(1);
        broker.send(make_event(1));
        broker.send(make_event(2));
        broker.send(make_event(3));

        let drained = handle.drain();
        assert_eq!(drained.len(), 1);
        assert!(matches!(
            drained[0],
            OracleEvent::SpecSubscription {
                activated_at: UnixTs(1),
                ..
            }
        ));
    }

    #[test]
    fn test_send_after_handle_dropped_is_silent() {
        let (broker, handle) = ChannelBroker::new(4);
        drop(handle);
        broker.send(make_event(1));
    }

    #[test]
    fn test_send_batch_preserves_order() {
        let (broker, handle) = ChannelBroker::new(4);
        broker.send_batch(vec![make_event(1), make_event(2)]);

        let drained = handle.drain();
        let stamps: Vec<i64> = drained
            .iter()
            .map(|e| match e {
                OracleEvent::SpecSubscription { activated_at, .. } => activated_at.0,
                OracleEvent::DataMatch { broadcast_at, .. } => broadcast_at.0,
            })
            .collect();
        assert_eq!(stamps, vec![1, 2]);
    }
}
