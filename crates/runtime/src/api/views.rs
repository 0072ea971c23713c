//! Read models returned to clients.

use game_core::{AttackEntry, Combatant, Hp, LeaderboardEntry, Opponent, SessionPhase};
use serde::Serialize;

use crate::resolver::AttackOutcome;

/// Everything a client needs to render a session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub player: Combatant,
    pub hp: Hp,
    pub wins: u64,
    pub phase: SessionPhase,
    pub opponents: Vec<Opponent>,
    /// Attacks received by the player, newest first.
    pub attacks: Vec<AttackEntry>,
    /// Last computed leaderboard; refreshed on start and after a win.
    pub leaderboard: Vec<LeaderboardEntry>,
    /// A scheduled reset is waiting to fire.
    pub reset_pending: bool,
}

/// Outcome of a session attack plus the phase it left the session in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AttackReport {
    #[serde(flatten)]
    pub outcome: AttackOutcome,
    pub phase: SessionPhase,
}
