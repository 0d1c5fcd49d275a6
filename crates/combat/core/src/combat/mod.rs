//! Attack resolution.
//!
//! Pure functions implementing the ability-score vs. target-value check:
//! the attacker's attack value (AS + 4dF + weapon modifier + penalties) is
//! compared to the defender's target value (defense AS + 4dF + posture and
//! gear modifiers); the margin decides miss, whiff penalty, or a located,
//! armor-absorbed hit whose damage is queued into the defender's pending
//! pools. Nothing here mutates state; callers apply the returned effects.

pub mod check;
pub mod damage;
pub mod location;
pub mod penalty;
pub mod resolve;

pub use check::{attack_value, success_value, target_value};
pub use damage::{DamageBreakdown, resolve_damage};
pub use location::HitLocation;
pub use penalty::TimedPenalty;
pub use resolve::{AttackOutcome, AttackResult, RollBreakdown, resolve_attack};
