//! Complete attack resolution: check, location, damage, side effects.

use crate::dice::DiceOracle;
use crate::equipment::DamageType;
use crate::stats::CombatantSnapshot;
use crate::tables::BalanceTables;
use crate::types::Timestamp;

use super::check::{attack_value, success_value, target_value};
use super::damage::{DamageBreakdown, resolve_damage};
use super::location::HitLocation;
use super::penalty::TimedPenalty;

/// Outcome of an attack attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackOutcome {
    Miss,
    Hit,
}

/// The raw numbers behind one resolution, kept for the action log.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RollBreakdown {
    pub attack_roll: i8,
    pub defense_roll: i8,
    pub attack_value: i32,
    pub target_value: i32,
    pub success_value: i32,
}

/// Result of resolving one attack.
///
/// This is a pure value object: the defender's pending-pool deltas and the
/// attacker's whiff penalty are *described* here and applied by the caller,
/// which keeps resolution free of state mutation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackResult {
    pub outcome: AttackOutcome,
    pub rolls: RollBreakdown,
    pub damage_type: DamageType,
    /// Body part struck (None on a miss).
    pub location: Option<HitLocation>,
    /// Damage to queue on the defender (None on a miss).
    pub damage: Option<DamageBreakdown>,
    /// Timed penalty to attach to the attacker (badly missed swings only).
    pub attacker_penalty: Option<TimedPenalty>,
    /// Room-facing narrative line.
    pub narrative: String,
}

impl AttackResult {
    pub fn is_hit(&self) -> bool {
        self.outcome == AttackOutcome::Hit
    }
}

/// Resolve one melee attack between two combatant snapshots.
///
/// Deterministic given the dice: attack value vs. target value, then on a
/// hit a d12 location roll, armor absorption, and the fatigue/vitality
/// split. On a severe miss the attacker earns a timed attack penalty from
/// the balance tables.
pub fn resolve_attack(
    attacker: &CombatantSnapshot<'_>,
    defender: &CombatantSnapshot<'_>,
    tables: &BalanceTables,
    dice: &mut dyn DiceOracle,
    now: Timestamp,
) -> AttackResult {
    let (av, attack_roll) = attack_value(attacker, dice, now);
    let (tv, defense_roll) = target_value(defender, tables, dice);
    let sv = success_value(av, tv);

    let rolls = RollBreakdown {
        attack_roll,
        defense_roll,
        attack_value: av,
        target_value: tv,
        success_value: sv,
    };
    let damage_type = attacker.weapon.damage_type;

    if sv <= 0 {
        let attacker_penalty = tables.whiff_penalty(sv, now);
        let narrative = miss_narrative(attacker, defender, attacker_penalty.is_some());
        return AttackResult {
            outcome: AttackOutcome::Miss,
            rolls,
            damage_type,
            location: None,
            damage: None,
            attacker_penalty,
            narrative,
        };
    }

    let location = HitLocation::from_d12(dice.roll_die(12));
    let damage = resolve_damage(sv, attacker.weapon, defender.armor, location, tables);
    let narrative = hit_narrative(attacker, defender, location, &damage);

    AttackResult {
        outcome: AttackOutcome::Hit,
        rolls,
        damage_type,
        location: Some(location),
        damage: Some(damage),
        attacker_penalty: None,
        narrative,
    }
}

fn hit_narrative(
    attacker: &CombatantSnapshot<'_>,
    defender: &CombatantSnapshot<'_>,
    location: HitLocation,
    damage: &DamageBreakdown,
) -> String {
    if damage.effective() == 0 {
        format!(
            "{} strikes {} on the {}, but the blow glances off armor",
            attacker.name, defender.name, location
        )
    } else {
        format!(
            "{} strikes {} on the {} with the {}",
            attacker.name, defender.name, location, attacker.weapon.name
        )
    }
}

fn miss_narrative(
    attacker: &CombatantSnapshot<'_>,
    defender: &CombatantSnapshot<'_>,
    off_balance: bool,
) -> String {
    if off_balance {
        format!(
            "{} swings wildly at {} and stumbles off balance",
            attacker.name, defender.name
        )
    } else {
        format!("{} misses {}", attacker.name, defender.name)
    }
}
