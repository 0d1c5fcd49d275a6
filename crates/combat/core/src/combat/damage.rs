//! Damage computation for a landed hit.

use crate::equipment::{Armor, DamageType, Weapon};
use crate::tables::BalanceTables;

use super::location::HitLocation;

/// Numeric damage outcome of one hit, before pool drain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageBreakdown {
    /// Pre-absorption damage: success value plus weapon damage bonus.
    pub raw: u32,
    /// Amount the defender's armor soaked at the struck location.
    pub absorbed: u32,
    /// Portion queued against the fatigue pool.
    pub fatigue: u32,
    /// Portion queued against the vitality pool.
    pub vitality: u32,
    /// Wounds inflicted (0 or 1 per hit).
    pub wounds: u32,
}

impl DamageBreakdown {
    /// Post-absorption damage total.
    pub fn effective(&self) -> u32 {
        self.fatigue + self.vitality
    }
}

/// Compute the damage of a successful attack.
///
/// Raw damage is the success margin plus the weapon's damage bonus; armor
/// at the struck location absorbs first, and the remainder splits between
/// the fatigue and vitality pools by the weapon's damage class. A vitality
/// portion at or past the wound threshold adds a wound.
pub fn resolve_damage(
    success_value: i32,
    weapon: &Weapon,
    armor: &Armor,
    location: HitLocation,
    tables: &BalanceTables,
) -> DamageBreakdown {
    debug_assert!(success_value > 0, "damage requires a successful attack");

    let raw = success_value.max(0) as u32 + weapon.damage_bonus;
    let soak = armor.absorption(location, weapon.damage_type);
    let absorbed = soak.min(raw);
    let remaining = raw - absorbed;

    let (fatigue, vitality) = tables.damage_split(weapon.damage_type).apply(remaining);
    let wounds = u32::from(vitality >= tables.wound_threshold);

    DamageBreakdown {
        raw,
        absorbed,
        fatigue,
        vitality,
        wounds,
    }
}
