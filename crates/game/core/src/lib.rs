//! Rules and data types for the social attack game.
//!
//! `game-core` defines the canonical rules (HP arithmetic, damage rolls,
//! the bounded attack log, session phases and leaderboard ranking) as pure
//! APIs. The runtime crate supplies persistence, the external directory and
//! scheduling around them.
pub mod combat;
pub mod config;
pub mod leaderboard;
pub mod session;
pub mod state;

pub use combat::{DamageRange, Dice, RETALIATION_WEAPON, RandomDice, ScriptedDice, apply_damage};
pub use config::GameConfig;
pub use leaderboard::{LeaderboardEntry, rank};
pub use session::{Opponent, ResetOutcome, Roster, RosterError, Session, SessionError, SessionPhase};
pub use state::{ATTACK_LOG_CAPACITY, AttackEntry, AttackLog, Combatant, Hp, PlayerId};
