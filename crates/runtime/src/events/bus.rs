//! Broadcast-channel event bus.

use tokio::sync::broadcast;

use super::types::{CombatEvent, Envelope, Scope};
use super::Publisher;

/// In-process event bus backed by a tokio broadcast channel.
///
/// Subscribers receive every envelope and filter by scope themselves;
/// publishing is best-effort and never blocks.
pub struct EventBus {
    tx: broadcast::Sender<Envelope>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with the given channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to the full event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }
}

impl Publisher for EventBus {
    fn publish(&self, scope: Scope, event: CombatEvent) {
        if self.tx.send(Envelope { scope, event }).is_err() {
            // No subscribers - this is normal, not an error.
            tracing::trace!("no subscribers for combat event");
        }
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{RoomId, SessionId, Timestamp};

    #[tokio::test]
    async fn subscribers_receive_published_envelopes() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.publish(
            Scope::Room(RoomId(3)),
            CombatEvent::SessionStarted {
                session: SessionId(1),
                room: RoomId(3),
                at: Timestamp::ZERO,
            },
        );

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.scope, Scope::Room(RoomId(3)));
        assert!(matches!(envelope.event, CombatEvent::SessionStarted { .. }));
    }

    #[test]
    fn envelopes_serialize_for_the_wire() {
        // Gateways forward envelopes to clients as JSON.
        let envelope = Envelope {
            scope: Scope::Room(RoomId(3)),
            event: CombatEvent::SessionStarted {
                session: SessionId(1),
                room: RoomId(3),
                at: Timestamp::new(12_000),
            },
        };

        let json = serde_json::to_string(&envelope).unwrap();
        let back: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scope, envelope.scope);
        assert!(matches!(back.event, CombatEvent::SessionStarted { at, .. } if at == Timestamp::new(12_000)));
    }
}
