//! Event payload and scope types.

use serde::{Deserialize, Serialize};

use combat_core::{
    AttackResult, CombatantRef, DamageBreakdown, EndReason, ParticipantId, RoomId, SessionId,
    Timestamp,
};

/// Who an event is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Everyone present in the room.
    Room(RoomId),
    /// One specific participant (detailed damage reports).
    Participant(ParticipantId),
}

/// One combat event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CombatEvent {
    SessionStarted {
        session: SessionId,
        room: RoomId,
        at: Timestamp,
    },
    ParticipantJoined {
        session: SessionId,
        participant: ParticipantId,
        combatant: CombatantRef,
        name: String,
    },
    /// Narrative line for a resolved attack, with the full breakdown.
    AttackResolved {
        session: SessionId,
        attacker: ParticipantId,
        defender: ParticipantId,
        result: AttackResult,
    },
    /// Detailed per-recipient damage report: what armor soaked and what
    /// was queued against each pool.
    DamageTaken {
        session: SessionId,
        participant: ParticipantId,
        damage: DamageBreakdown,
    },
    FleeAttempted {
        session: SessionId,
        participant: ParticipantId,
        name: String,
        succeeded: bool,
    },
    ParticipantFled {
        session: SessionId,
        participant: ParticipantId,
        name: String,
    },
    ParticipantDied {
        session: SessionId,
        participant: ParticipantId,
        name: String,
    },
    PostureChanged {
        session: SessionId,
        participant: ParticipantId,
        name: String,
        posture: combat_core::Posture,
    },
    SessionEnded {
        session: SessionId,
        room: RoomId,
        reason: EndReason,
        at: Timestamp,
    },
}

/// Event wrapper carrying its scope, as delivered by the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub scope: Scope,
    pub event: CombatEvent,
}
