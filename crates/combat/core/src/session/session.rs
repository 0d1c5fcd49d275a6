//! Session record and lifecycle state machine.

use crate::error::SessionError;
use crate::types::{RoomId, SessionId, Timestamp};

use super::participant::{CombatParticipant, LeaveReason};

/// Lifecycle of a combat session. `Pending` exists only between record
/// creation and the first persisted attack; there is no way back out of
/// `Ended`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SessionState {
    Pending,
    Active,
    Ended,
}

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    Death,
    Flee,
    Disengage,
}

impl From<LeaveReason> for EndReason {
    fn from(reason: LeaveReason) -> Self {
        match reason {
            LeaveReason::Death => EndReason::Death,
            LeaveReason::Flee => EndReason::Flee,
            LeaveReason::Disengage => EndReason::Disengage,
        }
    }
}

/// One combat encounter in one room.
///
/// Ended sessions are retained for the action log's referential integrity,
/// never deleted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSession {
    pub id: SessionId,
    pub room: RoomId,
    pub state: SessionState,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub end_reason: Option<EndReason>,
    /// Optimistic-concurrency version, bumped by the repository on save.
    pub version: u64,
}

impl CombatSession {
    /// Fresh pending session; activated once its first participants exist.
    pub fn new(room: RoomId, started_at: Timestamp) -> Self {
        Self {
            id: SessionId::default(),
            room,
            state: SessionState::Pending,
            started_at,
            ended_at: None,
            end_reason: None,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// `Pending -> Active`. Re-activating an ended session is an error.
    pub fn activate(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Pending => {
                self.state = SessionState::Active;
                Ok(())
            }
            SessionState::Active => Ok(()),
            SessionState::Ended => Err(SessionError::AlreadyEnded { session: self.id }),
        }
    }

    /// `Active -> Ended` with the causal reason.
    pub fn end(&mut self, reason: EndReason, now: Timestamp) -> Result<(), SessionError> {
        if self.state == SessionState::Ended {
            return Err(SessionError::AlreadyEnded { session: self.id });
        }
        self.state = SessionState::Ended;
        self.end_reason = Some(reason);
        self.ended_at = Some(now);
        Ok(())
    }
}

/// Decide whether an encounter is over.
///
/// A side "stands" while it has at least one active participant. When a
/// side no longer stands the session ends; the end reason is taken from the
/// most recent departure on the collapsed side (Death if the last active
/// opposing participant died, Flee if it ran, Disengage otherwise).
pub fn evaluate_end(participants: &[CombatParticipant]) -> Option<EndReason> {
    let mut attackers_stand = false;
    let mut defenders_stand = false;
    for p in participants {
        match p.side {
            super::Side::Attackers if p.active => attackers_stand = true,
            super::Side::Defenders if p.active => defenders_stand = true,
            _ => {}
        }
    }
    if attackers_stand && defenders_stand {
        return None;
    }

    // Last departure on a collapsed side carries the reason.
    let reason = participants
        .iter()
        .filter(|p| !p.active)
        .filter(|p| match p.side {
            super::Side::Attackers => !attackers_stand,
            super::Side::Defenders => !defenders_stand,
        })
        .max_by_key(|p| p.left_at.unwrap_or(Timestamp::ZERO))
        .and_then(|p| p.leave_reason)
        .map(EndReason::from)
        .unwrap_or(EndReason::Disengage);
    Some(reason)
}
