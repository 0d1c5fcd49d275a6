//! In-memory SessionRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use combat_core::{CombatSession, SessionId};

use crate::repository::{RepositoryError, Result, SessionRepository};

/// In-memory implementation of [`SessionRepository`].
///
/// Stores sessions in a map guarded by a `std::sync::RwLock`; critical
/// sections never await, so a blocking lock is fine here.
pub struct InMemorySessionRepo {
    sessions: RwLock<HashMap<SessionId, CombatSession>>,
    next_id: AtomicU64,
}

impl InMemorySessionRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemorySessionRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepo {
    async fn create(&self, mut session: CombatSession) -> Result<SessionId> {
        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        session.id = id;
        session.version = 1;
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        sessions.insert(id, session);
        Ok(id)
    }

    async fn load(&self, id: SessionId) -> Result<Option<CombatSession>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.get(&id).cloned())
    }

    async fn save(&self, session: &CombatSession) -> Result<u64> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let stored = sessions
            .get_mut(&session.id)
            .ok_or(RepositoryError::SessionNotFound(session.id))?;
        if stored.version != session.version {
            return Err(RepositoryError::VersionConflict {
                entity: session.id.to_string(),
                expected: session.version,
                stored: stored.version,
            });
        }
        *stored = session.clone();
        stored.version += 1;
        Ok(stored.version)
    }

    async fn list_active(&self) -> Result<Vec<SessionId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<SessionId> = sessions
            .values()
            .filter(|s| s.is_active())
            .map(|s| s.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}
