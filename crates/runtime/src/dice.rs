//! Live dice backed by the thread-local rand generator.

use combat_core::DiceOracle;
use rand::Rng;

/// Dice oracle drawing from `rand::thread_rng`.
///
/// Used for live play; tests and replays use the deterministic oracles
/// from `combat_core`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRngDice;

impl DiceOracle for ThreadRngDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(1..=sides.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolls_stay_in_range() {
        let mut dice = ThreadRngDice;
        for _ in 0..1000 {
            assert!((-4..=4).contains(&dice.roll_fudge4()));
            assert!((1..=12).contains(&dice.roll_die(12)));
        }
    }
}
