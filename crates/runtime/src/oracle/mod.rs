//! World oracle: the room/target-resolution collaborator.
//!
//! Room topology, target-name parsing, and spawn lifecycles live outside
//! the combat engine. The engine only asks where a combatant is and what
//! to call it.

use std::collections::HashMap;
use std::sync::RwLock;

use combat_core::{CombatantRef, RoomId};

/// Read-only view of the world the engine validates engagements against.
pub trait WorldOracle: Send + Sync {
    /// The room a combatant currently occupies, if it exists in the world.
    fn room_of(&self, combatant: CombatantRef) -> Option<RoomId>;

    /// True when both combatants occupy the same room.
    fn colocated(&self, a: CombatantRef, b: CombatantRef) -> bool {
        match (self.room_of(a), self.room_of(b)) {
            (Some(room_a), Some(room_b)) => room_a == room_b,
            _ => false,
        }
    }
}

/// Fixed world placement for tests and local runs.
pub struct StaticWorld {
    placements: RwLock<HashMap<CombatantRef, RoomId>>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self {
            placements: RwLock::new(HashMap::new()),
        }
    }

    /// Put a combatant in a room, replacing any previous placement.
    pub fn place(&self, combatant: CombatantRef, room: RoomId) {
        if let Ok(mut placements) = self.placements.write() {
            placements.insert(combatant, room);
        }
    }
}

impl Default for StaticWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldOracle for StaticWorld {
    fn room_of(&self, combatant: CombatantRef) -> Option<RoomId> {
        self.placements
            .read()
            .ok()
            .and_then(|placements| placements.get(&combatant).copied())
    }
}
