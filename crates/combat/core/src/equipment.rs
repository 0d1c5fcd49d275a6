//! Weapons, armor absorption, and defensive gear.

use crate::combat::HitLocation;

/// Damage classification used for armor absorption and pool splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageType {
    /// Edged weapons: swords, axes. Vitality-heavy.
    Cut,
    /// Points: spears, daggers. Mostly vitality.
    Pierce,
    /// Clubs, fists. Mostly fatigue.
    Blunt,
}

/// A melee weapon's contribution to attack resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    pub name: String,
    /// Added to the attack value; craftsmanship or balance.
    pub attack_modifier: i8,
    /// Added to the success value when computing raw damage.
    pub damage_bonus: u32,
    pub damage_type: DamageType,
}

impl Weapon {
    pub fn new(name: impl Into<String>, damage_type: DamageType) -> Self {
        Self {
            name: name.into(),
            attack_modifier: 0,
            damage_bonus: 0,
            damage_type,
        }
    }

    pub fn with_attack_modifier(mut self, modifier: i8) -> Self {
        self.attack_modifier = modifier;
        self
    }

    pub fn with_damage_bonus(mut self, bonus: u32) -> Self {
        self.damage_bonus = bonus;
        self
    }

    /// Bare hands: no modifiers, blunt damage.
    pub fn unarmed() -> Self {
        Self::new("fists", DamageType::Blunt)
    }
}

/// Absorption values of one armor piece against each damage type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Protection {
    pub cut: u32,
    pub pierce: u32,
    pub blunt: u32,
}

impl Protection {
    pub const fn new(cut: u32, pierce: u32, blunt: u32) -> Self {
        Self { cut, pierce, blunt }
    }

    pub fn against(&self, damage_type: DamageType) -> u32 {
        match damage_type {
            DamageType::Cut => self.cut,
            DamageType::Pierce => self.pierce,
            DamageType::Blunt => self.blunt,
        }
    }
}

/// Worn armor as a coverage table: which body parts are protected, and by
/// how much per damage type. Uncovered locations absorb nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Armor {
    coverage: Vec<(HitLocation, Protection)>,
}

impl Armor {
    /// No armor at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_piece(mut self, location: HitLocation, protection: Protection) -> Self {
        self.coverage.push((location, protection));
        self
    }

    /// Total absorption at a location against a damage type. Layered pieces
    /// covering the same location stack.
    pub fn absorption(&self, location: HitLocation, damage_type: DamageType) -> u32 {
        self.coverage
            .iter()
            .filter(|(covered, _)| *covered == location)
            .map(|(_, protection)| protection.against(damage_type))
            .sum()
    }
}

/// Defensive mode a combatant is actively using.
///
/// Ordering matters to the NPC policy: a posture compares as "better" when
/// its discriminant is higher, and the policy never regresses from a
/// strictly better available option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Posture {
    /// No active defense.
    Standard,
    /// Evasive footwork.
    Dodge,
    /// Deflecting with the weapon. Costs no fatigue to hold.
    Parry,
    /// Blocking behind a shield.
    Shield,
}

/// Defensive equipment modifiers feeding the target value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseGear {
    /// Shield block bonus; zero means no shield is carried.
    pub shield_bonus: i8,
    /// Parry bonus from the weapon's guard; zero means no parry-capable
    /// weapon.
    pub parry_bonus: i8,
    /// Always-on dodge modifier, typically negative for heavy armor.
    pub dodge_modifier: i8,
}

impl DefenseGear {
    pub const fn new(shield_bonus: i8, parry_bonus: i8, dodge_modifier: i8) -> Self {
        Self {
            shield_bonus,
            parry_bonus,
            dodge_modifier,
        }
    }

    /// Postures this gear can sustain, best last.
    pub fn available_postures(&self) -> Vec<Posture> {
        let mut postures = vec![Posture::Standard, Posture::Dodge];
        if self.parry_bonus > 0 {
            postures.push(Posture::Parry);
        }
        if self.shield_bonus > 0 {
            postures.push(Posture::Shield);
        }
        postures
    }

    /// The strongest posture this gear supports.
    pub fn best_posture(&self) -> Posture {
        self.available_postures()
            .into_iter()
            .max()
            .unwrap_or(Posture::Standard)
    }
}
