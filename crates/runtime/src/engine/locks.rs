//! Per-session mutual exclusion.
//!
//! Sessions are the unit of isolation: a tick pass and a player-initiated
//! attack on the same session must not interleave, while different
//! sessions proceed in parallel. The registry hands out one async mutex
//! per session id; lock handles are `Arc`s so the map lock itself is held
//! only briefly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use combat_core::SessionId;

/// Registry of per-session async locks.
pub struct SessionLocks {
    inner: Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// The lock for a session, created on first use.
    ///
    /// Ended sessions stop being locked and their entries are reclaimed by
    /// [`SessionLocks::release`].
    pub fn lock_for(&self, session: SessionId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(session).or_default())
    }

    /// Drop the lock entry for a session that has ended.
    pub fn release(&self, session: SessionId) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&session);
    }
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}
