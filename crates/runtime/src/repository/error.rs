//! Repository error type shared by all storage backends.

use combat_core::{CombatantRef, ParticipantId, SessionId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RepositoryError>;

#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("combat session {0} not found")]
    SessionNotFound(SessionId),

    #[error("participant {0} not found")]
    ParticipantNotFound(ParticipantId),

    #[error("combatant record {0} not found")]
    CombatantNotFound(CombatantRef),

    /// A writer raced past the per-session lock: the stored version no
    /// longer matches the version the caller loaded.
    #[error("version conflict on {entity}: expected {expected}, stored {stored}")]
    VersionConflict {
        entity: String,
        expected: u64,
        stored: u64,
    },

    #[error("repository lock poisoned")]
    LockPoisoned,

    /// Collaborator-side storage failure (connection lost, malformed row).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, RepositoryError::VersionConflict { .. })
    }
}
