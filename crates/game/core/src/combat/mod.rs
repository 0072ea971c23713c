//! Combat rules.
//!
//! Pure functions and the randomness seam used by the attack resolver.
//!
//! - `DamageRange`: closed integer range damage is drawn from
//! - `apply_damage`: HP reduction (clamped to 0)
//! - `Dice`: injectable source of damage rolls and retaliation checks

pub mod damage;
pub mod dice;

pub use damage::{DamageRange, RETALIATION_WEAPON, apply_damage};
pub use dice::{Dice, RandomDice, ScriptedDice};
