//! Common identifier and time newtypes shared across the engine.

use std::fmt;

/// Unique identifier for a combat session (one encounter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

/// Identifier for a room in the world. Room topology is owned by an
/// external collaborator; the engine only scopes sessions and events by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room#{}", self.0)
    }
}

/// Identifier for a player character record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u64);

/// Identifier for a spawned NPC instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcInstanceId(pub u64);

/// Identifier for one participant row within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "participant#{}", self.0)
    }
}

/// Identity of a combatant: exactly one of a player character or an NPC
/// instance. The tagged union makes the "never both, never neither"
/// invariant unrepresentable instead of a runtime check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantRef {
    Player(CharacterId),
    Npc(NpcInstanceId),
}

impl CombatantRef {
    /// Returns true if this combatant is NPC-backed.
    #[inline]
    pub const fn is_npc(self) -> bool {
        matches!(self, CombatantRef::Npc(_))
    }

    /// Returns true if this combatant is a player character.
    #[inline]
    pub const fn is_player(self) -> bool {
        matches!(self, CombatantRef::Player(_))
    }
}

impl fmt::Display for CombatantRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatantRef::Player(id) => write!(f, "pc#{}", id.0),
            CombatantRef::Npc(id) => write!(f, "npc#{}", id.0),
        }
    }
}

/// Wall-clock instant in milliseconds since the Unix epoch.
///
/// The core never reads a clock; callers pass the current instant in, which
/// keeps penalty expiry and session lifecycles testable with fixed times.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    /// This instant shifted forward by `millis`.
    pub fn plus_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Returns true if `self` is at or after `other`.
    pub fn has_reached(self, other: Timestamp) -> bool {
        self.0 >= other.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
