//! One combatant's presence in a session.

use crate::combat::TimedPenalty;
use crate::equipment::Posture;
use crate::error::SessionError;
use crate::types::{CombatantRef, ParticipantId, SessionId, Timestamp};

/// Which side of the encounter a participant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Attackers,
    Defenders,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Attackers => Side::Defenders,
            Side::Defenders => Side::Attackers,
        }
    }
}

/// Why a participant stopped fighting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LeaveReason {
    Death,
    Flee,
    Disengage,
}

/// A combatant enrolled in a session.
///
/// The identity reference and side are immutable after creation; only
/// posture, penalties, and the active/leave fields mutate. Rows are never
/// deleted — leaving soft-deletes via the active flag and leave reason.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatParticipant {
    pub id: ParticipantId,
    pub session: SessionId,
    /// Player character or NPC instance; set once.
    pub combatant: CombatantRef,
    /// Display name captured at join time.
    pub name: String,
    pub side: Side,
    pub posture: Posture,
    /// Last ranged attack, throttled by an outer subsystem.
    pub last_ranged_attack: Option<Timestamp>,
    /// Timed attack penalties, in application order.
    pub penalties: Vec<TimedPenalty>,
    pub joined_at: Timestamp,
    pub left_at: Option<Timestamp>,
    pub active: bool,
    pub leave_reason: Option<LeaveReason>,
    /// Optimistic-concurrency version, bumped by the repository on save.
    pub version: u64,
}

impl CombatParticipant {
    pub fn new(
        session: SessionId,
        combatant: CombatantRef,
        name: impl Into<String>,
        side: Side,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id: ParticipantId::default(),
            session,
            combatant,
            name: name.into(),
            side,
            posture: Posture::Standard,
            last_ranged_attack: None,
            penalties: Vec::new(),
            joined_at,
            left_at: None,
            active: false,
            leave_reason: None,
            version: 0,
        }
    }

    /// Soft-delete: mark inactive with the causal reason. Idempotence is a
    /// bug here — leaving twice indicates a broken caller.
    pub fn leave(&mut self, reason: LeaveReason, now: Timestamp) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::AlreadyLeft {
                participant: self.id,
            });
        }
        self.active = false;
        self.leave_reason = Some(reason);
        self.left_at = Some(now);
        Ok(())
    }

    /// Drop penalties whose expiry has passed. Returns how many expired.
    pub fn expire_penalties(&mut self, now: Timestamp) -> usize {
        let before = self.penalties.len();
        self.penalties.retain(|p| !p.is_expired(now));
        before - self.penalties.len()
    }

    pub fn add_penalty(&mut self, penalty: TimedPenalty) {
        self.penalties.push(penalty);
    }

    pub fn is_npc(&self) -> bool {
        self.combatant.is_npc()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NpcInstanceId;

    fn participant() -> CombatParticipant {
        let mut p = CombatParticipant::new(
            SessionId(1),
            CombatantRef::Npc(NpcInstanceId(7)),
            "goblin",
            Side::Defenders,
            Timestamp::ZERO,
        );
        p.active = true;
        p
    }

    #[test]
    fn leave_soft_deletes() {
        let mut p = participant();
        p.leave(LeaveReason::Flee, Timestamp::new(9_000)).unwrap();
        assert!(!p.active);
        assert_eq!(p.leave_reason, Some(LeaveReason::Flee));
        assert_eq!(p.left_at, Some(Timestamp::new(9_000)));
    }

    #[test]
    fn double_leave_is_rejected() {
        let mut p = participant();
        p.leave(LeaveReason::Death, Timestamp::ZERO).unwrap();
        assert!(p.leave(LeaveReason::Flee, Timestamp::ZERO).is_err());
    }

    #[test]
    fn penalty_expiry_retains_order() {
        let mut p = participant();
        p.add_penalty(TimedPenalty::new(-1, Timestamp::new(1_000)));
        p.add_penalty(TimedPenalty::new(-2, Timestamp::new(9_000)));
        p.add_penalty(TimedPenalty::new(-3, Timestamp::new(2_000)));

        let expired = p.expire_penalties(Timestamp::new(3_000));
        assert_eq!(expired, 2);
        assert_eq!(p.penalties.len(), 1);
        assert_eq!(p.penalties[0].delta, -2);
    }
}
