//! Event types for different topics.

use game_core::{Combatant, PlayerId};
use serde::{Deserialize, Serialize};

use crate::resolver::AttackOutcome;

/// Events published after an attack has been committed to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttackEvent {
    Resolved {
        attacker: Combatant,
        target: Combatant,
        outcome: AttackOutcome,
    },
}

impl AttackEvent {
    /// Announcement strings in the order they happened: the attack, then
    /// the retaliation if one fired.
    pub fn announcements(&self) -> Vec<&str> {
        match self {
            AttackEvent::Resolved { outcome, .. } => {
                let mut texts = vec![outcome.announcement.as_str()];
                if let Some(retaliation) = &outcome.retaliation {
                    texts.push(retaliation.announcement.as_str());
                }
                texts
            }
        }
    }
}

/// Session lifecycle events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session loaded and entered play.
    Started { player: PlayerId, opponents: usize },
    /// Game-over reached; a reset has been scheduled.
    GameOver { player: PlayerId, player_won: bool },
    /// HP restored for everyone in the session.
    Reset {
        player: PlayerId,
        player_won: bool,
        wins: u64,
    },
    /// Session torn down; any pending reset was cancelled.
    Closed { player: PlayerId },
}
