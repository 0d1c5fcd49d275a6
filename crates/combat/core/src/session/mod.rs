//! Combat-session lifecycle and participant records.
//!
//! A session is one encounter in one room. Its participants are split into
//! two sides; the session ends when a side has no active members left, and
//! the end reason is the causal event of the last opposing departure.
//! Ended sessions and departed participants are retained (soft-deleted)
//! so the append-only action log keeps valid references.

pub mod participant;
pub mod session;

pub use participant::{CombatParticipant, LeaveReason, Side};
pub use session::{CombatSession, EndReason, SessionState, evaluate_end};
