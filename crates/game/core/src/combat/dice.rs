//! Randomness used by attack resolution.
//!
//! The resolver never touches an RNG directly. It asks a [`Dice`] for a
//! damage roll and for the retaliation check, which keeps resolution
//! reproducible under test with [`ScriptedDice`].

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::DamageRange;

/// Source of damage rolls and retaliation checks.
pub trait Dice: Send {
    /// Draw a damage value uniformly from `range` (inclusive).
    fn damage(&mut self, range: DamageRange) -> u32;

    /// Returns true with probability `chance` (clamped to `[0, 1]`).
    fn retaliates(&mut self, chance: f64) -> bool;
}

/// [`Dice`] backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomDice<R = StdRng> {
    rng: R,
}

impl RandomDice<StdRng> {
    /// Seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R> RandomDice<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl Default for RandomDice<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: Rng + Send> Dice for RandomDice<R> {
    fn damage(&mut self, range: DamageRange) -> u32 {
        self.rng.gen_range(range.min..=range.max)
    }

    fn retaliates(&mut self, chance: f64) -> bool {
        if chance.is_nan() {
            return false;
        }
        self.rng.gen_bool(chance.clamp(0.0, 1.0))
    }
}

/// [`Dice`] replaying queued outcomes.
///
/// Once a queue runs dry, damage falls back to the range minimum and
/// retaliation to `false`. Scripted damage is clamped into the range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    damages: VecDeque<u32>,
    retaliations: VecDeque<bool>,
}

impl ScriptedDice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_damages(mut self, damages: impl IntoIterator<Item = u32>) -> Self {
        self.damages.extend(damages);
        self
    }

    pub fn with_retaliations(mut self, rolls: impl IntoIterator<Item = bool>) -> Self {
        self.retaliations.extend(rolls);
        self
    }
}

impl Dice for ScriptedDice {
    fn damage(&mut self, range: DamageRange) -> u32 {
        self.damages
            .pop_front()
            .map(|value| range.clamp(value))
            .unwrap_or(range.min)
    }

    fn retaliates(&mut self, _chance: f64) -> bool {
        self.retaliations.pop_front().unwrap_or(false)
    }
}
