//! Hit location die and body-part table.

use std::fmt;

/// Body part struck by a successful attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitLocation {
    Head,
    Torso,
    LeftArm,
    RightArm,
    LeftLeg,
    RightLeg,
}

impl HitLocation {
    /// Map a d12 roll to a body part.
    ///
    /// Torso dominates the table; head is rare but appears at both ends so
    /// the distribution is not order-sensitive:
    ///
    /// ```text
    /// 1        head
    /// 2-7      torso
    /// 8        left arm
    /// 9        right arm
    /// 10       left leg
    /// 11       right leg
    /// 12       head
    /// ```
    pub fn from_d12(roll: u32) -> Self {
        match roll {
            1 | 12 => HitLocation::Head,
            2..=7 => HitLocation::Torso,
            8 => HitLocation::LeftArm,
            9 => HitLocation::RightArm,
            10 => HitLocation::LeftLeg,
            11 => HitLocation::RightLeg,
            // Out-of-range rolls indicate a broken dice oracle; favor the
            // common case rather than panicking mid-resolution.
            _ => HitLocation::Torso,
        }
    }
}

impl fmt::Display for HitLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HitLocation::Head => "head",
            HitLocation::Torso => "torso",
            HitLocation::LeftArm => "left arm",
            HitLocation::RightArm => "right arm",
            HitLocation::LeftLeg => "left leg",
            HitLocation::RightLeg => "right leg",
        };
        write!(f, "{}", label)
    }
}
