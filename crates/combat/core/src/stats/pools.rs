//! Fatigue and vitality pools with deferred damage application.
//!
//! Both pools count damage UP from zero: an unhurt combatant sits at 0 and
//! death is vitality reaching its maximum (fatigue reaching its maximum is
//! incapacitation, not death). Incoming damage is never applied instantly;
//! it accumulates in signed pending deltas that the round scheduler drains
//! gradually, half the remaining magnitude per tick with a minimum step of
//! one, so every nonzero pending pool converges in a bounded number of
//! rounds. Negative pending values model healing.

use super::attributes::Attributes;

/// Health state embedded in every combatant record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthPools {
    /// Accumulated fatigue damage, `0..=max_fatigue`.
    pub fatigue: u32,
    /// Accumulated vitality damage, `0..=max_vitality`.
    pub vitality: u32,
    /// Number of wounds taken (vitality hits past the wound threshold).
    pub wounds: u32,
    /// Un-applied fatigue delta, drained across ticks. Positive = damage.
    pub pending_fatigue: i32,
    /// Un-applied vitality delta, drained across ticks. Positive = damage.
    pub pending_vitality: i32,
    /// Fatigue capacity, derived from drive + willpower.
    pub max_fatigue: u32,
    /// Vitality capacity, derived from strength + drive.
    pub max_vitality: u32,
    /// Set when damage lands this round; suppresses fatigue recovery.
    pub damaged_this_round: bool,
}

impl HealthPools {
    /// Fresh pools for a combatant with the given attributes.
    ///
    /// One formula set is used for players and NPCs alike:
    /// `max_vitality = strength + drive`, `max_fatigue = drive + willpower`,
    /// both floored at 1.
    pub fn for_attributes(attributes: &Attributes) -> Self {
        let max_vitality = (attributes.strength as u32 + attributes.drive as u32).max(1);
        let max_fatigue = (attributes.drive as u32 + attributes.willpower as u32).max(1);
        Self {
            fatigue: 0,
            vitality: 0,
            wounds: 0,
            pending_fatigue: 0,
            pending_vitality: 0,
            max_fatigue,
            max_vitality,
            damaged_this_round: false,
        }
    }

    /// Queue incoming damage for gradual application and flag the round.
    pub fn queue_damage(&mut self, fatigue: u32, vitality: u32, wounds: u32) {
        self.pending_fatigue += fatigue as i32;
        self.pending_vitality += vitality as i32;
        self.wounds += wounds;
        if fatigue > 0 || vitality > 0 {
            self.damaged_this_round = true;
        }
    }

    /// Queue healing (negative pending deltas, drained the same way).
    pub fn queue_healing(&mut self, fatigue: u32, vitality: u32) {
        self.pending_fatigue -= fatigue as i32;
        self.pending_vitality -= vitality as i32;
    }

    /// Apply one drain step to both pending pools.
    ///
    /// Each step moves half the remaining pending magnitude (rounded toward
    /// the delta's sign, never less than one while nonzero) into the current
    /// value, clamped to `[0, max]`. The pending delta is reduced by the
    /// attempted amount even when clamping discards part of it, which
    /// guarantees convergence to zero in `ceil(log2(|pending|)) + 1` steps.
    ///
    /// Returns the `(fatigue, vitality)` deltas actually applied to the
    /// current values.
    pub fn drain_step(&mut self) -> (i32, i32) {
        let fatigue_applied = Self::drain_pool(
            &mut self.fatigue,
            &mut self.pending_fatigue,
            self.max_fatigue,
        );
        let vitality_applied = Self::drain_pool(
            &mut self.vitality,
            &mut self.pending_vitality,
            self.max_vitality,
        );
        (fatigue_applied, vitality_applied)
    }

    fn drain_pool(current: &mut u32, pending: &mut i32, max: u32) -> i32 {
        if *pending == 0 {
            return 0;
        }
        let magnitude = (pending.unsigned_abs() + 1) / 2;
        let step = if *pending > 0 {
            magnitude as i32
        } else {
            -(magnitude as i32)
        };
        let before = *current as i32;
        let after = (before + step).clamp(0, max as i32);
        *current = after as u32;
        *pending -= step;
        after - before
    }

    /// Recover fatigue toward zero, unless damage landed this round.
    ///
    /// Does not touch the damage flag; callers reset it via
    /// [`HealthPools::end_round`] once the whole recovery phase is done.
    pub fn recover_fatigue(&mut self, amount: u32) {
        if self.damaged_this_round {
            return;
        }
        self.fatigue = self.fatigue.saturating_sub(amount);
    }

    /// Clear the per-round damage flag.
    pub fn end_round(&mut self) {
        self.damaged_this_round = false;
    }

    /// Vitality damage reached capacity: the combatant is dead.
    pub fn is_dead(&self) -> bool {
        self.vitality >= self.max_vitality
    }

    /// Fatigue damage reached capacity: the combatant is incapacitated.
    pub fn is_exhausted(&self) -> bool {
        self.fatigue >= self.max_fatigue
    }

    /// Fatigue headroom left before incapacitation.
    pub fn fatigue_reserve(&self) -> u32 {
        self.max_fatigue.saturating_sub(self.fatigue)
    }

    /// Remaining vitality as a per-mille fraction of the maximum
    /// (1000 = unhurt, 0 = dead). Integer math keeps the policy
    /// deterministic.
    pub fn remaining_vitality_permille(&self) -> u32 {
        let remaining = self.max_vitality.saturating_sub(self.vitality);
        remaining * 1000 / self.max_vitality.max(1)
    }
}

impl Default for HealthPools {
    fn default() -> Self {
        Self::for_attributes(&Attributes::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pools(max_fatigue: u32, max_vitality: u32) -> HealthPools {
        HealthPools {
            fatigue: 0,
            vitality: 0,
            wounds: 0,
            pending_fatigue: 0,
            pending_vitality: 0,
            max_fatigue,
            max_vitality,
            damaged_this_round: false,
        }
    }

    #[test]
    fn queued_damage_lands_in_pending_not_current() {
        let mut p = pools(10, 10);
        p.queue_damage(1, 2, 0);
        assert_eq!(p.fatigue, 0);
        assert_eq!(p.vitality, 0);
        assert_eq!(p.pending_fatigue, 1);
        assert_eq!(p.pending_vitality, 2);
        assert!(p.damaged_this_round);
    }

    #[test]
    fn drain_applies_half_rounded_up() {
        let mut p = pools(20, 20);
        p.queue_damage(0, 7, 0);
        p.drain_step();
        assert_eq!(p.vitality, 4);
        assert_eq!(p.pending_vitality, 3);
        p.drain_step();
        assert_eq!(p.vitality, 6);
        assert_eq!(p.pending_vitality, 1);
        p.drain_step();
        assert_eq!(p.vitality, 7);
        assert_eq!(p.pending_vitality, 0);
    }

    #[test]
    fn drain_minimum_step_is_one() {
        let mut p = pools(10, 10);
        p.queue_damage(1, 0, 0);
        p.drain_step();
        assert_eq!(p.fatigue, 1);
        assert_eq!(p.pending_fatigue, 0);
    }

    #[test]
    fn pending_converges_within_logarithmic_bound() {
        for initial in [1u32, 2, 5, 17, 100, 1023] {
            let mut p = pools(10_000, 10_000);
            p.queue_damage(0, initial, 0);
            let bound = (initial as f64).log2().ceil() as u32 + 1;
            let mut steps = 0;
            while p.pending_vitality != 0 {
                p.drain_step();
                steps += 1;
                assert!(steps <= bound, "pending {} took > {} steps", initial, bound);
            }
        }
    }

    #[test]
    fn current_values_never_leave_bounds() {
        let mut p = pools(6, 6);
        p.queue_damage(50, 50, 0);
        for _ in 0..10 {
            p.drain_step();
            assert!(p.fatigue <= p.max_fatigue);
            assert!(p.vitality <= p.max_vitality);
        }
        // Overshoot was discarded by the clamp but pending still drained.
        assert_eq!(p.pending_fatigue, 0);
        assert_eq!(p.pending_vitality, 0);
        assert!(p.is_dead());
        assert!(p.is_exhausted());

        p.queue_healing(100, 100);
        for _ in 0..10 {
            p.drain_step();
        }
        assert_eq!(p.fatigue, 0);
        assert_eq!(p.vitality, 0);
    }

    #[test]
    fn recovery_skipped_while_damaged_flag_set() {
        let mut p = pools(10, 10);
        p.fatigue = 4;
        p.damaged_this_round = true;
        p.recover_fatigue(1);
        assert_eq!(p.fatigue, 4);
        p.end_round();
        p.recover_fatigue(1);
        assert_eq!(p.fatigue, 3);
    }

    #[test]
    fn recovery_clamps_at_zero() {
        let mut p = pools(10, 10);
        p.recover_fatigue(3);
        assert_eq!(p.fatigue, 0);
    }

    #[test]
    fn remaining_vitality_fraction() {
        let mut p = pools(10, 10);
        assert_eq!(p.remaining_vitality_permille(), 1000);
        p.vitality = 8;
        assert_eq!(p.remaining_vitality_permille(), 200);
        p.vitality = 10;
        assert_eq!(p.remaining_vitality_permille(), 0);
    }

    #[test]
    fn maximums_derive_from_attributes() {
        let attrs = Attributes::new(8, 5, 6, 4, 5);
        let p = HealthPools::for_attributes(&attrs);
        assert_eq!(p.max_vitality, 14); // strength + drive
        assert_eq!(p.max_fatigue, 10); // drive + willpower
    }
}
