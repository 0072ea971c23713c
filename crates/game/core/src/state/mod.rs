//! Persistent player state: identifiers, hit points and attack logs.
//!
//! These are the values the runtime stores per player. Everything here is
//! plain data with range invariants enforced at construction.
mod attack_log;
mod player;

pub use attack_log::{ATTACK_LOG_CAPACITY, AttackEntry, AttackLog};
pub use player::{Combatant, Hp, PlayerId};
