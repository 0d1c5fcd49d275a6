//! In-memory CombatantRepository implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use combat_core::{CombatantRecord, CombatantRef};

use crate::repository::{CombatantRepository, RepositoryError, Result};

/// In-memory store of combatant records keyed by identity.
pub struct InMemoryCombatantRepo {
    records: RwLock<HashMap<CombatantRef, CombatantRecord>>,
}

impl InMemoryCombatantRepo {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Seed a combatant record; used by tests and local setups.
    pub fn insert(&self, combatant: CombatantRef, record: CombatantRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert(combatant, record);
        }
    }
}

impl Default for InMemoryCombatantRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CombatantRepository for InMemoryCombatantRepo {
    async fn load(&self, combatant: CombatantRef) -> Result<Option<CombatantRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&combatant).cloned())
    }

    async fn save(&self, combatant: CombatantRef, record: &CombatantRecord) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        records.insert(combatant, record.clone());
        Ok(())
    }
}
