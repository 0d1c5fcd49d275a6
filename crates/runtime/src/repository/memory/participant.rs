//! In-memory ParticipantRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use combat_core::{CombatParticipant, CombatantRef, ParticipantId, SessionId};

use crate::repository::{ParticipantRepository, RepositoryError, Result};

/// In-memory implementation of [`ParticipantRepository`].
pub struct InMemoryParticipantRepo {
    participants: RwLock<HashMap<ParticipantId, CombatParticipant>>,
    next_id: AtomicU64,
}

impl InMemoryParticipantRepo {
    pub fn new() -> Self {
        Self {
            participants: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryParticipantRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParticipantRepository for InMemoryParticipantRepo {
    async fn create(&self, mut participant: CombatParticipant) -> Result<ParticipantId> {
        let id = ParticipantId(self.next_id.fetch_add(1, Ordering::Relaxed));
        participant.id = id;
        participant.version = 1;
        let mut participants = self
            .participants
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        participants.insert(id, participant);
        Ok(id)
    }

    async fn load(&self, id: ParticipantId) -> Result<Option<CombatParticipant>> {
        let participants = self
            .participants
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(participants.get(&id).cloned())
    }

    async fn save(&self, participant: &CombatParticipant) -> Result<u64> {
        let mut participants = self
            .participants
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let stored = participants
            .get_mut(&participant.id)
            .ok_or(RepositoryError::ParticipantNotFound(participant.id))?;
        if stored.version != participant.version {
            return Err(RepositoryError::VersionConflict {
                entity: participant.id.to_string(),
                expected: participant.version,
                stored: stored.version,
            });
        }
        *stored = participant.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    async fn in_session(&self, session: SessionId) -> Result<Vec<CombatParticipant>> {
        let participants = self
            .participants
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut rows: Vec<CombatParticipant> = participants
            .values()
            .filter(|p| p.session == session)
            .cloned()
            .collect();
        // Join order; participant ids break timestamp ties.
        rows.sort_by_key(|p| (p.joined_at, p.id));
        Ok(rows)
    }

    async fn active_for(&self, combatant: CombatantRef) -> Result<Option<CombatParticipant>> {
        let participants = self
            .participants
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(participants
            .values()
            .find(|p| p.active && p.combatant == combatant)
            .cloned())
    }
}
