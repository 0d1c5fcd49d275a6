//! Persistence contracts and the in-memory reference implementation.
//!
//! The engine does not own a storage schema; it requires load/save by
//! identifier for sessions, participants, and the health-bearing combatant
//! records, plus an append-only action log. Sessions and participants carry
//! an optimistic version so racing writers are detected instead of silently
//! losing pending-pool updates.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{RepositoryError, Result};
pub use memory::{
    InMemoryActionLog, InMemoryCombatantRepo, InMemoryParticipantRepo, InMemorySessionRepo,
};
pub use traits::{
    ActionLogRepository, CombatantRepository, ParticipantRepository, SessionRepository,
};
