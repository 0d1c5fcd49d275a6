//! Repository contracts for combat state.

use async_trait::async_trait;

use combat_core::{
    ActionLogEntry, CombatParticipant, CombatSession, CombatantRecord, CombatantRef,
    ParticipantId, SessionId,
};

use super::error::Result;

/// Persistence for [`CombatSession`] records.
///
/// `create` assigns and returns the session id; `save` enforces optimistic
/// versioning — the caller passes the record at the version it loaded, the
/// store bumps it on success and returns the new version, or fails with
/// `VersionConflict` if another writer got there first.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Store a new session, assigning its id.
    async fn create(&self, session: CombatSession) -> Result<SessionId>;

    /// Load a session by id.
    async fn load(&self, id: SessionId) -> Result<Option<CombatSession>>;

    /// Save at the loaded version; bumps and returns the stored version.
    async fn save(&self, session: &CombatSession) -> Result<u64>;

    /// Ids of all sessions currently in the `Active` state.
    async fn list_active(&self) -> Result<Vec<SessionId>>;
}

/// Persistence for [`CombatParticipant`] rows. Same versioning discipline
/// as sessions; rows are soft-deleted only.
#[async_trait]
pub trait ParticipantRepository: Send + Sync {
    /// Store a new participant, assigning its id.
    async fn create(&self, participant: CombatParticipant) -> Result<ParticipantId>;

    /// Load a participant by id.
    async fn load(&self, id: ParticipantId) -> Result<Option<CombatParticipant>>;

    /// Save at the loaded version; bumps and returns the stored version.
    async fn save(&self, participant: &CombatParticipant) -> Result<u64>;

    /// All participants of a session (active and departed), in join order.
    async fn in_session(&self, session: SessionId) -> Result<Vec<CombatParticipant>>;

    /// The active participant row for a combatant, if it is in a fight.
    async fn active_for(&self, combatant: CombatantRef) -> Result<Option<CombatParticipant>>;
}

/// Persistence for the health-bearing combatant records (player characters
/// and NPC instances). The engine only reads and writes the combat-shaped
/// field set; ownership of the full character sheet stays external.
#[async_trait]
pub trait CombatantRepository: Send + Sync {
    async fn load(&self, combatant: CombatantRef) -> Result<Option<CombatantRecord>>;

    async fn save(&self, combatant: CombatantRef, record: &CombatantRecord) -> Result<()>;
}

/// Append-only action log. Appends from different sessions may interleave;
/// entries are never mutated or deleted.
#[async_trait]
pub trait ActionLogRepository: Send + Sync {
    async fn append(&self, entry: ActionLogEntry) -> Result<()>;

    /// Entries for one session, in append order.
    async fn for_session(&self, session: SessionId) -> Result<Vec<ActionLogEntry>>;
}
