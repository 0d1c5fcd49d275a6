//! In-memory repository implementations for tests and local runs.

pub mod combatant;
pub mod log;
pub mod participant;
pub mod session;

pub use combatant::InMemoryCombatantRepo;
pub use log::InMemoryActionLog;
pub use participant::InMemoryParticipantRepo;
pub use session::InMemorySessionRepo;
