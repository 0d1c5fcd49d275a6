//! Combatant attributes, skills, and health pools.

pub mod attributes;
pub mod pools;
pub mod record;

pub use attributes::{Attributes, CombatSkills, ability_score};
pub use pools::HealthPools;
pub use record::{CombatantRecord, CombatantSnapshot};
