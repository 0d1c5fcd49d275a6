//! Timed attack-value penalties.
//!
//! A badly missed swing (success value below the whiff threshold) leaves the
//! attacker off balance: a negative attack-value delta with an expiry
//! timestamp. Magnitudes and durations are game-balance data from
//! [`crate::tables::BalanceTables`], not algorithm constants.

use crate::types::Timestamp;

/// A temporary attack-value modifier with an expiry instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimedPenalty {
    /// Delta applied to the attack value; negative for penalties.
    pub delta: i8,
    pub expires_at: Timestamp,
}

impl TimedPenalty {
    pub fn new(delta: i8, expires_at: Timestamp) -> Self {
        Self { delta, expires_at }
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.has_reached(self.expires_at)
    }
}

/// Sum of the non-expired penalty deltas.
pub fn active_total(penalties: &[TimedPenalty], now: Timestamp) -> i32 {
    penalties
        .iter()
        .filter(|p| !p.is_expired(now))
        .map(|p| p.delta as i32)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_penalties_do_not_count() {
        let penalties = vec![
            TimedPenalty::new(-2, Timestamp::new(1_000)),
            TimedPenalty::new(-1, Timestamp::new(5_000)),
        ];
        assert_eq!(active_total(&penalties, Timestamp::new(0)), -3);
        assert_eq!(active_total(&penalties, Timestamp::new(1_000)), -1);
        assert_eq!(active_total(&penalties, Timestamp::new(5_000)), 0);
    }
}
