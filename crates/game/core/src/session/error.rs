//! Errors raised by session rules.

use thiserror::Error;

use super::SessionPhase;
use crate::state::PlayerId;

/// Attack rejected by the session before reaching the resolver.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is {phase}, attacks require an active session")]
    NotActive { phase: SessionPhase },

    #[error("player is defeated")]
    PlayerDefeated,

    #[error("player {0} is not an opponent in this session")]
    UnknownOpponent(PlayerId),

    #[error("opponent {0} is already defeated")]
    OpponentDefeated(PlayerId),
}

/// Opponent search failures. Surfaced to the UI as messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("no player found matching \"{0}\"")]
    NotFound(String),

    #[error("player {0} is already an opponent")]
    AlreadyOpponent(PlayerId),

    #[error("player {0} cannot be their own opponent")]
    IsPlayer(PlayerId),
}
