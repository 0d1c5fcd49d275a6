//! Game-balance tables.
//!
//! Concrete magnitudes (whiff penalty severities, flee thresholds, damage
//! splits) are tuning data, not algorithm structure. They ship with defaults
//! and can be overridden from configuration by the runtime crate.

use crate::combat::TimedPenalty;
use crate::equipment::DamageType;
use crate::types::Timestamp;

/// One severity band of the whiff-penalty table.
///
/// A band applies when the attack's deficit (`-success_value`) is at least
/// `min_deficit`; the steepest matching band wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WhiffBand {
    pub min_deficit: u32,
    /// Attack-value delta while the penalty lasts; negative.
    pub delta: i8,
    pub duration_ms: i64,
}

/// How post-absorption damage divides between the fatigue and vitality
/// pools for one damage type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSplit {
    pub fatigue_weight: u32,
    pub vitality_weight: u32,
}

impl DamageSplit {
    pub const fn new(fatigue_weight: u32, vitality_weight: u32) -> Self {
        Self {
            fatigue_weight,
            vitality_weight,
        }
    }

    /// Divide `total` into `(fatigue, vitality)` portions. The fatigue
    /// portion rounds down; vitality takes the remainder.
    pub fn apply(&self, total: u32) -> (u32, u32) {
        let weights = self.fatigue_weight + self.vitality_weight;
        if weights == 0 {
            return (0, total);
        }
        let fatigue = total * self.fatigue_weight / weights;
        (fatigue, total - fatigue)
    }
}

/// Balance parameters consumed by attack resolution, the tick scheduler,
/// and the NPC decision policy.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BalanceTables {
    /// Round length driven by the scheduler host.
    pub round_interval_ms: u64,
    /// Fatigue restored per undamaged round.
    pub fatigue_recovery_per_round: u32,
    /// Vitality portion at or above this increments the wound count.
    pub wound_threshold: u32,
    /// Success values strictly below this earn a timed penalty.
    pub whiff_threshold: i32,
    /// Severity bands for the whiff penalty, steepest band wins.
    pub whiff_bands: Vec<WhiffBand>,
    /// Target-value bonus granted by the dodge posture.
    pub dodge_bonus: i8,
    /// Default flee threshold: remaining vitality per-mille below which an
    /// NPC tries to run.
    pub flee_threshold_permille: u32,
    /// Upper end of the personality-modified flee range.
    pub flee_threshold_ceiling_permille: u32,
    /// When fatigue reserve drops below this, NPCs fall back to the
    /// no-cost parry posture.
    pub parry_fatigue_floor: u32,
    pub cut_split: DamageSplit,
    pub pierce_split: DamageSplit,
    pub blunt_split: DamageSplit,
}

impl Default for BalanceTables {
    fn default() -> Self {
        Self {
            round_interval_ms: 3_000,
            fatigue_recovery_per_round: 1,
            wound_threshold: 3,
            whiff_threshold: -3,
            whiff_bands: vec![
                WhiffBand {
                    min_deficit: 4,
                    delta: -1,
                    duration_ms: 9_000,
                },
                WhiffBand {
                    min_deficit: 7,
                    delta: -2,
                    duration_ms: 15_000,
                },
                WhiffBand {
                    min_deficit: 10,
                    delta: -3,
                    duration_ms: 21_000,
                },
            ],
            dodge_bonus: 1,
            flee_threshold_permille: 250,
            flee_threshold_ceiling_permille: 300,
            parry_fatigue_floor: 3,
            cut_split: DamageSplit::new(1, 2),
            pierce_split: DamageSplit::new(1, 3),
            blunt_split: DamageSplit::new(2, 1),
        }
    }
}

impl BalanceTables {
    /// Pool split for a damage type.
    pub fn damage_split(&self, damage_type: DamageType) -> DamageSplit {
        match damage_type {
            DamageType::Cut => self.cut_split,
            DamageType::Pierce => self.pierce_split,
            DamageType::Blunt => self.blunt_split,
        }
    }

    /// Timed penalty earned by a badly missed attack, if any.
    ///
    /// Returns `None` when the success value is at or above the whiff
    /// threshold or no band matches the deficit.
    pub fn whiff_penalty(&self, success_value: i32, now: Timestamp) -> Option<TimedPenalty> {
        if success_value >= self.whiff_threshold {
            return None;
        }
        let deficit = success_value.unsigned_abs();
        self.whiff_bands
            .iter()
            .filter(|band| band.min_deficit <= deficit)
            .max_by_key(|band| band.min_deficit)
            .map(|band| TimedPenalty::new(band.delta, now.plus_millis(band.duration_ms)))
    }

    /// Personality-modified flee threshold, clamped into the configured
    /// range. `personality` in [0, 255] scales between floor and ceiling.
    pub fn flee_threshold_for(&self, personality: u8) -> u32 {
        let floor = self.flee_threshold_permille;
        let ceiling = self.flee_threshold_ceiling_permille.max(floor);
        floor + (ceiling - floor) * personality as u32 / 255
    }
}
