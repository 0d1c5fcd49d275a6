//! Raw attributes, trained skills, and the ability-score formula.

/// Innate attribute block shared by players and NPCs.
///
/// Attribute scale is 1-15 for ordinary combatants; 5 is an unremarkable
/// adult. Maximum pool sizes derive from these (see
/// [`super::pools::HealthPools`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attributes {
    /// Physical power; governs melee attacks and vitality.
    pub strength: u8,
    /// Coordination and reflexes; governs defense and mobility.
    pub agility: u8,
    /// Endurance and stamina; governs both pool maximums.
    pub drive: u8,
    /// Mental resilience; contributes to fatigue capacity.
    pub willpower: u8,
    /// Situational awareness; governs pursuit checks against fleeing foes.
    pub perception: u8,
}

impl Attributes {
    pub const fn new(strength: u8, agility: u8, drive: u8, willpower: u8, perception: u8) -> Self {
        Self {
            strength,
            agility,
            drive,
            willpower,
            perception,
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        // Baseline adult combatant.
        Self::new(5, 5, 5, 5, 5)
    }
}

/// Trained skill levels relevant to melee combat.
///
/// Levels are 0-10; 0 means untrained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatSkills {
    /// Skill with the equipped weapon.
    pub weapon: u8,
    /// Active defense (dodge/parry/shield work).
    pub defense: u8,
    /// Footwork; used for flee attempts.
    pub mobility: u8,
    /// Used to chase down or intercept a fleeing opponent.
    pub awareness: u8,
}

impl CombatSkills {
    pub const fn new(weapon: u8, defense: u8, mobility: u8, awareness: u8) -> Self {
        Self {
            weapon,
            defense,
            mobility,
            awareness,
        }
    }
}

/// Ability Score: governing attribute plus skill level, offset by the
/// baseline of 5 and floored at zero.
///
/// An untrained baseline combatant (attribute 5, skill 0) has AS 0 and
/// relies entirely on the dice.
pub fn ability_score(attribute: u8, skill_level: u8) -> u32 {
    (attribute as u32 + skill_level as u32).saturating_sub(5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ability_score_offsets_baseline() {
        assert_eq!(ability_score(8, 5), 8);
        assert_eq!(ability_score(5, 0), 0);
        assert_eq!(ability_score(10, 3), 8);
    }

    #[test]
    fn ability_score_floors_at_zero() {
        assert_eq!(ability_score(2, 0), 0);
        assert_eq!(ability_score(0, 4), 0);
        assert_eq!(ability_score(1, 3), 0);
    }
}
