//! Persistent combatant data and the read view used by resolution.

use crate::combat::TimedPenalty;
use crate::equipment::{Armor, DefenseGear, Posture, Weapon};

use super::attributes::{Attributes, CombatSkills};
use super::pools::HealthPools;

/// Everything the engine persists about a combatant's fighting shape,
/// shared verbatim by player characters and NPC instances.
///
/// Per-encounter state (posture, timed penalties) lives on the session
/// participant, not here; identity lives in
/// [`crate::types::CombatantRef`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantRecord {
    pub name: String,
    pub attributes: Attributes,
    pub skills: CombatSkills,
    pub weapon: Weapon,
    pub armor: Armor,
    pub gear: DefenseGear,
    pub pools: HealthPools,
    /// Flee-threshold bias, 0 = steadfast, 255 = cowardly. Only read for
    /// NPC-backed combatants.
    pub personality: u8,
}

impl CombatantRecord {
    /// A combatant with the given attributes, unarmed and unarmored,
    /// pools at full health.
    pub fn new(name: impl Into<String>, attributes: Attributes, skills: CombatSkills) -> Self {
        Self {
            name: name.into(),
            attributes,
            skills,
            weapon: Weapon::unarmed(),
            armor: Armor::none(),
            gear: DefenseGear::default(),
            pools: HealthPools::for_attributes(&attributes),
            personality: 128,
        }
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = weapon;
        self
    }

    pub fn with_armor(mut self, armor: Armor) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_gear(mut self, gear: DefenseGear) -> Self {
        self.gear = gear;
        self
    }

    pub fn with_personality(mut self, personality: u8) -> Self {
        self.personality = personality;
        self
    }

    /// Borrow a resolution view, combining this record with the
    /// per-encounter posture and penalties carried by the participant.
    pub fn snapshot<'a>(
        &'a self,
        posture: Posture,
        penalties: &'a [TimedPenalty],
    ) -> CombatantSnapshot<'a> {
        CombatantSnapshot {
            name: &self.name,
            attributes: &self.attributes,
            skills: &self.skills,
            weapon: &self.weapon,
            armor: &self.armor,
            gear: &self.gear,
            posture,
            penalties,
            pools: &self.pools,
        }
    }
}

/// Read-only view of one side of an attack check.
///
/// Borrowed from a [`CombatantRecord`] plus the participant's encounter
/// state; the resolver never sees anything it could mutate.
#[derive(Clone, Copy, Debug)]
pub struct CombatantSnapshot<'a> {
    pub name: &'a str,
    pub attributes: &'a Attributes,
    pub skills: &'a CombatSkills,
    pub weapon: &'a Weapon,
    pub armor: &'a Armor,
    pub gear: &'a DefenseGear,
    pub posture: Posture,
    pub penalties: &'a [TimedPenalty],
    pub pools: &'a HealthPools,
}
