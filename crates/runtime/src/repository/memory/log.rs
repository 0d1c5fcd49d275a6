//! In-memory append-only ActionLogRepository implementation.

use std::sync::RwLock;

use async_trait::async_trait;

use combat_core::{ActionLogEntry, SessionId};

use crate::repository::{ActionLogRepository, RepositoryError, Result};

/// In-memory append-only action log.
///
/// Appends from different sessions interleave in arrival order; entries are
/// never mutated.
pub struct InMemoryActionLog {
    entries: RwLock<Vec<ActionLogEntry>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Total number of appended entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryActionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionLogRepository for InMemoryActionLog {
    async fn append(&self, entry: ActionLogEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.push(entry);
        Ok(())
    }

    async fn for_session(&self, session: SessionId) -> Result<Vec<ActionLogEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries
            .iter()
            .filter(|e| e.session == session)
            .cloned()
            .collect())
    }
}
