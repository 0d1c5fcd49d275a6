//! Attack-value vs. target-value computation.

use crate::dice::DiceOracle;
use crate::equipment::Posture;
use crate::stats::{CombatantSnapshot, ability_score};
use crate::tables::BalanceTables;
use crate::types::Timestamp;

use super::penalty;

/// Attacker's attack value: weapon ability score, a fudge roll, the
/// weapon's attack modifier, and any active timed penalties.
///
/// Returns `(attack_value, fudge_roll)` so callers can report the raw roll.
pub fn attack_value(
    attacker: &CombatantSnapshot<'_>,
    dice: &mut dyn DiceOracle,
    now: Timestamp,
) -> (i32, i8) {
    let score = ability_score(attacker.attributes.strength, attacker.skills.weapon);
    let roll = dice.roll_fudge4();
    let value = score as i32
        + roll as i32
        + attacker.weapon.attack_modifier as i32
        + penalty::active_total(attacker.penalties, now);
    (value, roll)
}

/// Defender's target value: defense ability score, a fudge roll, the active
/// posture's modifier, and the always-on equipment dodge modifier.
pub fn target_value(
    defender: &CombatantSnapshot<'_>,
    tables: &BalanceTables,
    dice: &mut dyn DiceOracle,
) -> (i32, i8) {
    let score = ability_score(defender.attributes.agility, defender.skills.defense);
    let roll = dice.roll_fudge4();
    let value = score as i32
        + roll as i32
        + posture_modifier(defender.posture, defender, tables)
        + defender.gear.dodge_modifier as i32;
    (value, roll)
}

/// Target-value bonus of the active defensive posture.
fn posture_modifier(
    posture: Posture,
    defender: &CombatantSnapshot<'_>,
    tables: &BalanceTables,
) -> i32 {
    match posture {
        Posture::Standard => 0,
        Posture::Dodge => tables.dodge_bonus as i32,
        Posture::Parry => defender.gear.parry_bonus as i32,
        Posture::Shield => defender.gear.shield_bonus as i32,
    }
}

/// Success value: the attack's margin over the defense. Positive hits.
pub fn success_value(attack: i32, target: i32) -> i32 {
    attack - target
}
