//! Pure combat mechanics for real-time melee resolution.
//!
//! This crate contains the deterministic core of the combat engine: dice
//! resolution, combatant health pools, the attack-resolution algorithm,
//! the combat-session state machine, and the NPC decision policy. Everything
//! here is side-effect free: no I/O, no clock access, no task spawning.
//! Randomness enters exclusively through the [`DiceOracle`] trait and wall
//! time enters as an explicit [`Timestamp`] argument, so every function can
//! be unit tested with scripted rolls and fixed clocks.
//!
//! Modules are organized by responsibility:
//! - [`dice`] provides the bounded random resolution primitive (4dF, dN)
//! - [`stats`] holds attributes, skills, and the fatigue/vitality pools
//! - [`equipment`] describes weapons, armor absorption, and defense gear
//! - [`combat`] implements attack resolution (AV vs TV, location, damage)
//! - [`session`] owns the encounter lifecycle and participant records
//! - [`npc`] is the pure flee / defend / attack decision policy
//! - [`tables`] carries game-balance data loaded from configuration
//!
//! The async orchestration (round scheduler, repositories, event publishing)
//! lives in the `runtime` crate.

pub mod combat;
pub mod dice;
pub mod equipment;
pub mod log;
pub mod npc;
pub mod session;
pub mod stats;
pub mod tables;
pub mod types;

mod error;

pub use combat::{
    AttackOutcome, AttackResult, DamageBreakdown, HitLocation, RollBreakdown, TimedPenalty,
    resolve_attack,
};
pub use dice::{DiceOracle, PcgDice, ScriptedDice};
pub use equipment::{Armor, DamageType, DefenseGear, Posture, Protection, Weapon};
pub use error::SessionError;
pub use log::{ActionKind, ActionLogEntry};
pub use npc::{NpcAction, OpponentView, decide, resolve_flee};
pub use session::{
    CombatParticipant, CombatSession, EndReason, LeaveReason, SessionState, Side, evaluate_end,
};
pub use stats::{Attributes, CombatSkills, CombatantRecord, CombatantSnapshot, HealthPools};
pub use tables::BalanceTables;
pub use types::{
    CharacterId, CombatantRef, NpcInstanceId, ParticipantId, RoomId, SessionId, Timestamp,
};
