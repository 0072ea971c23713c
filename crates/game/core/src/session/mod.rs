//! Session state machine.
//!
//! A [`Session`] tracks one player's HP and opponent roster for the duration
//! of a visit, derives game-over, and computes what a reset must persist.
//! It performs no I/O: the runtime loads inputs, feeds HP changes back in,
//! and acts on the returned [`ResetOutcome`].
mod error;
mod phase;
mod roster;

pub use error::{RosterError, SessionError};
pub use phase::SessionPhase;
pub use roster::{Opponent, Roster};

use crate::state::{Combatant, Hp, PlayerId};

/// What a reset changed, for the caller to persist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetOutcome {
    /// The session had reached game-over and the player still had HP.
    pub player_won: bool,
    /// Player first, then every opponent. All are now at full HP.
    pub restored: Vec<PlayerId>,
}

#[derive(Clone, Debug)]
pub struct Session {
    player: Combatant,
    player_hp: Hp,
    roster: Roster,
    phase: SessionPhase,
}

impl Session {
    /// New session in [`SessionPhase::Loading`].
    pub fn loading(player: Combatant) -> Self {
        Self {
            player,
            player_hp: Hp::MAX,
            roster: Roster::new(),
            phase: SessionPhase::Loading,
        }
    }

    /// Leave `Loading` with the fetched HP and roster.
    ///
    /// The roster may be empty (directory failure is fail-open). Returns
    /// true if the loaded values already put the session in game-over.
    pub fn activate(&mut self, player_hp: Hp, roster: Roster) -> bool {
        self.player_hp = player_hp;
        self.roster = roster;
        self.phase = SessionPhase::Active;
        self.refresh_phase()
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn player_id(&self) -> PlayerId {
        self.player.id
    }

    pub fn player_hp(&self) -> Hp {
        self.player_hp
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Validate an attack on `target` against the session rules.
    pub fn check_attack(&self, target: PlayerId) -> Result<&Opponent, SessionError> {
        if !self.phase.is_active() {
            return Err(SessionError::NotActive { phase: self.phase });
        }
        if self.player_hp.is_defeated() {
            return Err(SessionError::PlayerDefeated);
        }
        let opponent = self
            .roster
            .get(target)
            .ok_or(SessionError::UnknownOpponent(target))?;
        if opponent.hp.is_defeated() {
            return Err(SessionError::OpponentDefeated(target));
        }
        Ok(opponent)
    }

    /// Mirror a persisted HP change for the player or an opponent.
    ///
    /// Ids outside the session are ignored.
    pub fn record_hp(&mut self, id: PlayerId, hp: Hp) {
        if id == self.player.id {
            self.player_hp = hp;
        } else if let Some(opponent) = self.roster.get_mut(id) {
            opponent.hp = hp;
        }
    }

    pub fn add_opponent(&mut self, opponent: Opponent) -> Result<(), RosterError> {
        if opponent.id == self.player.id {
            return Err(RosterError::IsPlayer(opponent.id));
        }
        self.roster.insert(opponent)
    }

    /// Whether current HP values satisfy the game-over condition.
    pub fn is_decided(&self) -> bool {
        self.player_hp.is_defeated() || self.roster.all_defeated()
    }

    /// Move an active session to game-over if it is decided.
    ///
    /// Returns true only on the transition, so callers schedule one reset.
    pub fn refresh_phase(&mut self) -> bool {
        if self.phase.is_active() && self.is_decided() {
            self.phase = SessionPhase::GameOver;
            return true;
        }
        false
    }

    /// What [`reset`](Self::reset) would do right now, without doing it.
    ///
    /// The win is judged on the player's HP before restoring. Resetting a
    /// game that was not over never counts as a win. Callers persist this
    /// outcome first and only then apply it.
    pub fn reset_outcome(&self) -> ResetOutcome {
        ResetOutcome {
            player_won: self.phase.is_game_over() && !self.player_hp.is_defeated(),
            restored: std::iter::once(self.player.id)
                .chain(self.roster.ids())
                .collect(),
        }
    }

    /// Restore everyone to full HP and return to `Active`.
    pub fn reset(&mut self) -> ResetOutcome {
        let outcome = self.reset_outcome();

        self.player_hp = Hp::MAX;
        self.roster.restore_all();
        self.phase = SessionPhase::Active;

        outcome
    }
}
