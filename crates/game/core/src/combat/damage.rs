//! Damage range and application.

use crate::state::Hp;

/// Weapon name recorded for automatic counter-attacks.
pub const RETALIATION_WEAPON: &str = "Retaliation Strike";

/// Closed integer range `[min, max]` damage values are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRange {
    pub min: u32,
    pub max: u32,
}

impl DamageRange {
    pub const DEFAULT_MIN: u32 = 10;
    pub const DEFAULT_MAX: u32 = 30;

    /// Create a range, swapping the bounds if given in reverse.
    pub fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Force `value` into the range.
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }
}

impl Default for DamageRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Apply damage to current HP.
///
/// # Returns
///
/// New HP value (clamped to 0)
pub fn apply_damage(current: Hp, damage: u32) -> Hp {
    current.after_damage(damage)
}
