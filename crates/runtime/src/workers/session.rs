//! Session worker that owns one player's [`game_core::Session`].
//!
//! Receives commands from [`crate::SessionHandle`], validates attacks against
//! the session rules, drives the [`AttackResolver`], and owns the scheduled
//! reset. The reset deadline lives in the worker's select loop, so a manual
//! reset, a close, or dropping the worker cancels it.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Instant};
use tracing::{debug, error, info, warn};

use game_core::{
    ATTACK_LOG_CAPACITY, AttackEntry, Combatant, GameConfig, Hp, LeaderboardEntry, Opponent,
    PlayerId, Roster, RosterError, Session,
};

use crate::api::{AttackReport, Result, RuntimeError, SessionView};
use crate::directory::{self, Directory};
use crate::events::{Event, EventBus, SessionEvent};
use crate::leaderboard::Leaderboard;
use crate::repository::GameStore;
use crate::resolver::AttackResolver;

/// Results requested when searching for an opponent by username.
const SEARCH_LIMIT: usize = 5;

/// Commands that can be sent to a session worker
pub enum Command {
    /// Read the current session view.
    Snapshot {
        reply: oneshot::Sender<Result<SessionView>>,
    },
    /// Attack an opponent in the roster.
    Attack {
        target: PlayerId,
        weapon: String,
        reply: oneshot::Sender<Result<AttackReport>>,
    },
    /// Search the directory and add the match to the roster.
    AddOpponent {
        username: String,
        reply: oneshot::Sender<Result<Opponent>>,
    },
    /// Reset now, cancelling a scheduled reset.
    Reset {
        reply: oneshot::Sender<Result<SessionView>>,
    },
    /// Stop the worker.
    Close { reply: oneshot::Sender<()> },
}

/// Shared collaborators every session worker uses.
#[derive(Clone)]
pub struct SessionDeps {
    pub store: Arc<dyn GameStore>,
    pub directory: Arc<dyn Directory>,
    pub resolver: AttackResolver,
    pub leaderboard: Leaderboard,
    pub event_bus: EventBus,
    pub config: GameConfig,
    pub reset_delay: Duration,
}

/// Background task that processes one player's session commands.
pub struct SessionWorker {
    session: Session,
    wins: u64,
    leaderboard_view: Vec<LeaderboardEntry>,
    reset_at: Option<Instant>,
    deps: SessionDeps,
    command_rx: mpsc::Receiver<Command>,
}

impl SessionWorker {
    /// Creates a worker in the loading phase. Loading runs at the start of
    /// [`run`](Self::run); commands sent meanwhile wait in the channel.
    pub fn new(player: Combatant, deps: SessionDeps, command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            session: Session::loading(player),
            wins: 0,
            leaderboard_view: Vec::new(),
            reset_at: None,
            deps,
            command_rx,
        }
    }

    fn player_id(&self) -> PlayerId {
        self.session.player_id()
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        self.load().await;

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => {
                        if !self.handle_command(cmd).await {
                            break;
                        }
                    }
                    None => {
                        self.close();
                        break;
                    }
                },
                _ = reset_due(self.reset_at) => {
                    self.scheduled_reset().await;
                }
            }
        }
    }

    /// Returns false once the worker should stop.
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Snapshot { reply } => {
                let result = self.snapshot().await;
                if reply.send(result).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Attack {
                target,
                weapon,
                reply,
            } => {
                let result = self.handle_attack(target, &weapon).await;
                if reply.send(result).is_err() {
                    debug!("Attack reply channel closed (caller dropped)");
                }
            }
            Command::AddOpponent { username, reply } => {
                let result = self.handle_add_opponent(&username).await;
                if reply.send(result).is_err() {
                    debug!("AddOpponent reply channel closed (caller dropped)");
                }
            }
            Command::Reset { reply } => {
                let result = match self.handle_reset().await {
                    Ok(()) => self.snapshot().await,
                    Err(e) => Err(e),
                };
                if reply.send(result).is_err() {
                    debug!("Reset reply channel closed (caller dropped)");
                }
            }
            Command::Close { reply } => {
                self.close();
                if reply.send(()).is_err() {
                    debug!("Close reply channel closed (caller dropped)");
                }
                return false;
            }
        }
        true
    }

    /// Fetch HP, roster, wins and leaderboard, then leave `Loading`.
    ///
    /// Every fetch falls back to its default on failure.
    async fn load(&mut self) {
        let player = self.player_id();
        let player_hp = self.fetch_hp(player).await;

        let mut contacts = match self
            .deps
            .directory
            .following(player, self.deps.config.roster_size)
            .await
        {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!("Following lookup for {} failed, starting with no opponents: {}", player, e);
                Vec::new()
            }
        };
        contacts.retain(|profile| profile.id != player);
        contacts.truncate(self.deps.config.roster_size);

        let mut candidates: Vec<(PlayerId, String)> = contacts
            .into_iter()
            .map(|profile| (profile.id, profile.name().to_string()))
            .collect();

        if let Some(partner) = self.deps.config.paired_opponent(player)
            && !candidates.iter().any(|(id, _)| *id == partner)
        {
            let name = directory::display_name(self.deps.directory.as_ref(), partner).await;
            candidates.push((partner, name));
        }

        let mut opponents = Vec::with_capacity(candidates.len());
        for (id, name) in candidates {
            let hp = self.fetch_hp(id).await;
            opponents.push(Opponent::new(id, name, hp));
        }

        self.wins = match self.deps.store.wins(player).await {
            Ok(wins) => wins,
            Err(e) => {
                warn!("Wins read for {} failed, showing 0: {}", player, e);
                0
            }
        };
        self.refresh_leaderboard().await;

        let decided = self
            .session
            .activate(player_hp, Roster::from_opponents(opponents));

        info!(
            "Session for {} started with {} opponents (hp {})",
            player,
            self.session.roster().len(),
            self.session.player_hp()
        );
        self.deps
            .event_bus
            .publish(Event::Session(SessionEvent::Started {
                player,
                opponents: self.session.roster().len(),
            }));

        if decided {
            self.enter_game_over();
        }
    }

    async fn fetch_hp(&self, id: PlayerId) -> Hp {
        match self.deps.store.hp(id).await {
            Ok(hp) => hp,
            Err(e) => {
                warn!("HP read for {} failed, using full HP: {}", id, e);
                Hp::MAX
            }
        }
    }

    async fn refresh_leaderboard(&mut self) {
        match self.deps.leaderboard.compute().await {
            Ok(entries) => self.leaderboard_view = entries,
            Err(e) => {
                warn!("Leaderboard refresh failed: {}", e);
                self.leaderboard_view.clear();
            }
        }
    }

    async fn snapshot(&mut self) -> Result<SessionView> {
        let player = self.player_id();

        // Other sessions may have attacked this player since the last look.
        if self.session.phase().is_active() {
            match self.deps.store.hp(player).await {
                Ok(hp) => {
                    self.session.record_hp(player, hp);
                    if self.session.refresh_phase() {
                        self.enter_game_over();
                    }
                }
                Err(e) => warn!("HP refresh for {} failed: {}", player, e),
            }
        }

        let attacks: Vec<AttackEntry> = match self
            .deps
            .store
            .recent_attacks(player, ATTACK_LOG_CAPACITY)
            .await
        {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Attack log read for {} failed: {}", player, e);
                Vec::new()
            }
        };

        Ok(SessionView {
            player: self.session.player().clone(),
            hp: self.session.player_hp(),
            wins: self.wins,
            phase: self.session.phase(),
            opponents: self.session.roster().iter().cloned().collect(),
            attacks,
            leaderboard: self.leaderboard_view.clone(),
            reset_pending: self.reset_at.is_some(),
        })
    }

    async fn handle_attack(&mut self, target: PlayerId, weapon: &str) -> Result<AttackReport> {
        let weapon = weapon.trim();
        if weapon.is_empty() {
            return Err(RuntimeError::Validation("weapon must not be empty".into()));
        }

        let opponent = self.session.check_attack(target)?;
        let target = Combatant::new(opponent.id, opponent.display_name.clone());
        let attacker = self.session.player().clone();

        let outcome = match self.deps.resolver.resolve(&attacker, &target, weapon).await {
            Ok(outcome) => outcome,
            Err(e) => {
                // Writes before the failure stay committed.
                self.resync_hp(&[target.id, attacker.id]).await;
                return Err(e.into());
            }
        };

        self.session.record_hp(target.id, outcome.target_hp);
        if let Some(retaliation) = &outcome.retaliation {
            self.session.record_hp(attacker.id, retaliation.attacker_hp);
        }
        if self.session.refresh_phase() {
            self.enter_game_over();
        }

        Ok(AttackReport {
            outcome,
            phase: self.session.phase(),
        })
    }

    /// Re-read HP for `ids` from the store after a partially failed write.
    async fn resync_hp(&mut self, ids: &[PlayerId]) {
        for &id in ids {
            match self.deps.store.hp(id).await {
                Ok(hp) => self.session.record_hp(id, hp),
                Err(e) => warn!("HP resync for {} failed: {}", id, e),
            }
        }
        if self.session.refresh_phase() {
            self.enter_game_over();
        }
    }

    async fn handle_add_opponent(&mut self, username: &str) -> Result<Opponent> {
        let query = username.trim().trim_start_matches('@');
        if query.is_empty() {
            return Err(RuntimeError::Validation("username must not be empty".into()));
        }

        let hits = match self.deps.directory.search(query, SEARCH_LIMIT).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Username search for {:?} failed: {}", query, e);
                Vec::new()
            }
        };
        let profile = directory::best_match(query, hits)
            .ok_or_else(|| RosterError::NotFound(query.to_string()))?;

        if self.session.roster().contains(profile.id) {
            return Err(RosterError::AlreadyOpponent(profile.id).into());
        }

        let hp = self.fetch_hp(profile.id).await;
        let opponent = Opponent::new(profile.id, profile.name(), hp);
        self.session.add_opponent(opponent.clone())?;

        debug!("Added opponent {} to session {}", opponent.id, self.player_id());
        Ok(opponent)
    }

    fn enter_game_over(&mut self) {
        let player = self.player_id();
        let player_won = !self.session.player_hp().is_defeated();
        self.reset_at = Some(Instant::now() + self.deps.reset_delay);

        info!(
            "Session for {} is over (player won: {}), reset in {:?}",
            player, player_won, self.deps.reset_delay
        );
        self.deps
            .event_bus
            .publish(Event::Session(SessionEvent::GameOver { player, player_won }));
    }

    async fn scheduled_reset(&mut self) {
        if let Err(e) = self.handle_reset().await {
            self.reset_at = Some(Instant::now() + self.deps.reset_delay);
            error!(
                "Scheduled reset for {} failed, retrying in {:?}: {}",
                self.player_id(),
                self.deps.reset_delay,
                e
            );
        }
    }

    /// Restore full HP for everyone and record a win if the player won.
    ///
    /// Store writes happen before the in-memory session changes. If one
    /// fails the session keeps its phase, pending win and schedule, so a
    /// retry still records the win. `reset_hp` is idempotent, so a retry
    /// after a failed win increment only rewrites full HP.
    async fn handle_reset(&mut self) -> Result<()> {
        let player = self.player_id();
        let outcome = self.session.reset_outcome();
        self.deps.store.reset_hp(&outcome.restored).await?;

        if outcome.player_won {
            self.wins = self.deps.store.increment_wins(player).await?;
        }

        self.session.reset();
        self.reset_at = None;
        if outcome.player_won {
            self.refresh_leaderboard().await;
        }

        info!(
            "Session for {} reset (player won: {}, wins: {})",
            player, outcome.player_won, self.wins
        );
        self.deps.event_bus.publish(Event::Session(SessionEvent::Reset {
            player,
            player_won: outcome.player_won,
            wins: self.wins,
        }));
        Ok(())
    }

    fn close(&mut self) {
        if self.reset_at.take().is_some() {
            debug!("Cancelled pending reset for {}", self.player_id());
        }
        self.deps.event_bus.publish(Event::Session(SessionEvent::Closed {
            player: self.player_id(),
        }));
    }
}

/// Completes at the deadline, or never when no reset is scheduled.
async fn reset_due(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}
