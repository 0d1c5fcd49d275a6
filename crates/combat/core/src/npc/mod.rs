//! NPC decision policy.
//!
//! Pure function from a state snapshot to one action per round, evaluated
//! in strict priority order: flee when badly hurt, improve the defensive
//! posture when warranted, otherwise attack the primary opponent with the
//! same resolution mechanics players use. No hidden state: everything the
//! policy reads is an argument, so it unit-tests with scripted dice.

pub mod policy;

pub use policy::{NpcAction, OpponentView, decide, resolve_flee};
