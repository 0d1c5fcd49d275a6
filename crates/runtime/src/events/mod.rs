//! Outbound combat events.
//!
//! The engine emits one narrative event per resolved action, scoped to the
//! room, plus one detailed payload per damage recipient, scoped to that
//! participant. Delivery to connected clients is an external concern: the
//! engine only requires the [`Publisher`] trait, and ships a broadcast
//! [`EventBus`] for in-process consumers and tests.

pub mod bus;
pub mod types;

pub use bus::EventBus;
pub use types::{CombatEvent, Envelope, Scope};

/// Outbound event sink the engine publishes through.
///
/// Publishing is fire-and-forget; a scope without listeners is normal.
pub trait Publisher: Send + Sync {
    fn publish(&self, scope: Scope, event: CombatEvent);
}
