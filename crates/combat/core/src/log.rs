//! Append-only combat action log entries.
//!
//! One immutable record per resolved action. Storage is a runtime concern;
//! this module only defines the record shape so the log's consumers and
//! producers agree on it.

use crate::combat::{DamageBreakdown, HitLocation, RollBreakdown};
use crate::equipment::DamageType;
use crate::types::{CombatantRef, SessionId, Timestamp};

/// What kind of action a log entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Join,
    Attack,
    Flee,
    Death,
    Disengage,
}

/// Immutable record of one resolved action. Never mutated after append.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionLogEntry {
    pub at: Timestamp,
    pub session: SessionId,
    pub kind: ActionKind,
    pub actor: CombatantRef,
    pub actor_name: String,
    pub target: Option<CombatantRef>,
    pub target_name: Option<String>,
    /// Present for attack entries.
    pub rolls: Option<RollBreakdown>,
    pub damage: Option<DamageBreakdown>,
    pub location: Option<HitLocation>,
    pub damage_type: Option<DamageType>,
    pub narrative: String,
}

impl ActionLogEntry {
    /// A non-attack entry (join, flee, death, disengage).
    pub fn event(
        at: Timestamp,
        session: SessionId,
        kind: ActionKind,
        actor: CombatantRef,
        actor_name: impl Into<String>,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            at,
            session,
            kind,
            actor,
            actor_name: actor_name.into(),
            target: None,
            target_name: None,
            rolls: None,
            damage: None,
            location: None,
            damage_type: None,
            narrative: narrative.into(),
        }
    }

    /// An attack entry carrying the full numeric breakdown.
    #[allow(clippy::too_many_arguments)]
    pub fn attack(
        at: Timestamp,
        session: SessionId,
        actor: CombatantRef,
        actor_name: impl Into<String>,
        target: CombatantRef,
        target_name: impl Into<String>,
        rolls: RollBreakdown,
        damage: Option<DamageBreakdown>,
        location: Option<HitLocation>,
        damage_type: DamageType,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            at,
            session,
            kind: ActionKind::Attack,
            actor,
            actor_name: actor_name.into(),
            target: Some(target),
            target_name: Some(target_name.into()),
            rolls: Some(rolls),
            damage,
            location,
            damage_type: Some(damage_type),
            narrative: narrative.into(),
        }
    }
}
