//! High-level runtime orchestrator.
//!
//! The runtime owns the shared collaborators (store, directory, resolver,
//! event bus), spawns one worker per live session plus the announcement
//! worker, and exposes a builder-based API for the transport layer.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use game_core::{
    Combatant, DamageRange, Dice, GameConfig, LeaderboardEntry, PlayerId, RandomDice,
};

use crate::api::registry::SessionEntry;
use crate::api::{Result, RuntimeError, SessionHandle, SessionRegistry};
use crate::directory::{self, Broadcaster, Directory, LogBroadcaster, StaticDirectory};
use crate::events::{EventBus, Topic};
use crate::leaderboard::Leaderboard;
use crate::repository::{GameStore, InMemoryStore};
use crate::resolver::AttackResolver;
use crate::workers::{AnnouncementWorker, Command, SessionDeps, SessionWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game: GameConfig,
    /// Delay between game-over and the automatic reset.
    pub reset_delay: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl RuntimeConfig {
    pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(5);

    /// Construct configuration from process environment variables.
    ///
    /// - `ROSTER_SIZE`, `RETALIATION_CHANCE`, `DAMAGE_MIN` / `DAMAGE_MAX`
    /// - `MUTUAL_PAIR` as `"<id>,<id>"`
    /// - `RESET_DELAY_MS`
    /// - `EVENT_BUFFER_SIZE` / `COMMAND_BUFFER_SIZE`
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(size) = read_env::<usize>("ROSTER_SIZE") {
            config.game.roster_size = size;
        }

        if let Some(chance) = read_env::<f64>("RETALIATION_CHANCE")
            && chance.is_finite()
        {
            config.game.retaliation_chance = chance.clamp(0.0, 1.0);
        }

        let min = read_env::<u32>("DAMAGE_MIN").unwrap_or(config.game.damage.min);
        let max = read_env::<u32>("DAMAGE_MAX").unwrap_or(config.game.damage.max);
        config.game.damage = DamageRange::new(min, max);

        if let Some(pair) = env::var("MUTUAL_PAIR").ok().as_deref().and_then(parse_pair) {
            config.game.mutual_pair = Some(pair);
        }

        if let Some(ms) = read_env::<u64>("RESET_DELAY_MS") {
            config.reset_delay = Duration::from_millis(ms);
        }

        if let Some(capacity) = read_env::<usize>("EVENT_BUFFER_SIZE") {
            config.event_buffer_size = capacity.max(1);
        }

        if let Some(capacity) = read_env::<usize>("COMMAND_BUFFER_SIZE") {
            config.command_buffer_size = capacity.max(1);
        }

        config
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            reset_delay: Self::DEFAULT_RESET_DELAY,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

/// Parse `"<id>,<id>"`.
fn parse_pair(raw: &str) -> Option<(PlayerId, PlayerId)> {
    let (a, b) = raw.split_once(',')?;
    Some((a.parse().ok()?, b.parse().ok()?))
}

/// Main runtime that orchestrates game sessions
///
/// Design: the runtime owns workers and coordinates lifecycle.
/// [`SessionHandle`] provides a cloneable façade per session.
pub struct GameRuntime {
    config: RuntimeConfig,
    store: Arc<dyn GameStore>,
    directory: Arc<dyn Directory>,
    resolver: AttackResolver,
    leaderboard: Leaderboard,
    event_bus: EventBus,
    sessions: SessionRegistry,

    announcer_handle: JoinHandle<()>,
    announcer_shutdown: oneshot::Sender<()>,
}

impl GameRuntime {
    /// Create a new runtime builder
    pub fn builder() -> GameRuntimeBuilder {
        GameRuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn GameStore> {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn resolver(&self) -> &AttackResolver {
        &self.resolver
    }

    /// Start a session for `player`, closing any session it already has.
    pub async fn start_session(&self, player: PlayerId) -> Result<SessionHandle> {
        if let Some(previous) = self.sessions.remove(player).await {
            close_quietly(&previous).await;
            Self::join(previous).await?;
        }

        let name = directory::display_name(self.directory.as_ref(), player).await;
        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = SessionHandle::new(player, command_tx, self.event_bus.clone());

        let worker = SessionWorker::new(Combatant::new(player, name), self.session_deps(), command_rx);
        let task = tokio::spawn(async move {
            worker.run().await;
        });

        if let Some(raced) = self
            .sessions
            .insert(SessionEntry {
                handle: handle.clone(),
                task,
            })
            .await
        {
            close_quietly(&raced).await;
        }

        Ok(handle)
    }

    /// Handle to the live session for `player`.
    pub async fn session(&self, player: PlayerId) -> Result<SessionHandle> {
        self.sessions
            .get(player)
            .await
            .ok_or(RuntimeError::UnknownSession(player))
    }

    /// Tear down the session for `player`, cancelling a pending reset.
    pub async fn end_session(&self, player: PlayerId) -> Result<()> {
        let entry = self
            .sessions
            .remove(player)
            .await
            .ok_or(RuntimeError::UnknownSession(player))?;
        close_quietly(&entry).await;
        Self::join(entry).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    /// Compute the leaderboard now.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        Ok(self.leaderboard.compute().await?)
    }

    fn session_deps(&self) -> SessionDeps {
        SessionDeps {
            store: Arc::clone(&self.store),
            directory: Arc::clone(&self.directory),
            resolver: self.resolver.clone(),
            leaderboard: self.leaderboard.clone(),
            event_bus: self.event_bus.clone(),
            config: self.config.game.clone(),
            reset_delay: self.config.reset_delay,
        }
    }

    async fn join(entry: SessionEntry) -> Result<()> {
        entry.task.await.map_err(RuntimeError::WorkerJoin)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Closes every session (cancelling pending resets) and stops the
    /// announcement worker.
    pub async fn shutdown(self) -> Result<()> {
        for entry in self.sessions.drain().await {
            close_quietly(&entry).await;
            Self::join(entry).await?;
        }

        if self.announcer_shutdown.send(()).is_err() {
            tracing::debug!("AnnouncementWorker already stopped");
        }
        self.announcer_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Close a session whose worker may already be gone.
async fn close_quietly(entry: &SessionEntry) {
    if let Err(e) = entry.handle.close().await {
        tracing::debug!("Session {} already closed: {}", entry.handle.player(), e);
    }
}

/// Builder for [`GameRuntime`] with flexible configuration.
///
/// Unset collaborators default to an in-memory store, an empty static
/// directory, a log-only broadcaster, and entropy-seeded dice.
pub struct GameRuntimeBuilder {
    config: RuntimeConfig,
    store: Option<Arc<dyn GameStore>>,
    directory: Option<Arc<dyn Directory>>,
    broadcaster: Option<Arc<dyn Broadcaster>>,
    dice: Option<Box<dyn Dice>>,
}

impl GameRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            store: None,
            directory: None,
            broadcaster: None,
            dice: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(mut self, store: Arc<dyn GameStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn directory(mut self, directory: Arc<dyn Directory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn broadcaster(mut self, broadcaster: Arc<dyn Broadcaster>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    pub fn dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    /// Build the runtime and spawn the announcement worker.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(self) -> GameRuntime {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(InMemoryStore::new()));
        let directory = self
            .directory
            .unwrap_or_else(|| Arc::new(StaticDirectory::new()));
        let broadcaster = self
            .broadcaster
            .unwrap_or_else(|| Arc::new(LogBroadcaster));
        let dice = self
            .dice
            .unwrap_or_else(|| Box::new(RandomDice::from_entropy()));

        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);
        let resolver = AttackResolver::new(
            Arc::clone(&store),
            dice,
            self.config.game.clone(),
            event_bus.clone(),
        );
        let leaderboard = Leaderboard::new(Arc::clone(&store), Arc::clone(&directory));

        let (announcer_shutdown, shutdown_rx) = oneshot::channel();
        let announcer =
            AnnouncementWorker::new(event_bus.subscribe(Topic::Attack), broadcaster, shutdown_rx);
        let announcer_handle = tokio::spawn(async move {
            announcer.run().await;
        });

        tracing::info!(
            "Game runtime ready (damage {}..={}, retaliation {}, roster {}, reset after {:?})",
            self.config.game.damage.min,
            self.config.game.damage.max,
            self.config.game.retaliation_chance,
            self.config.game.roster_size,
            self.config.reset_delay
        );

        GameRuntime {
            config: self.config,
            store,
            directory,
            resolver,
            leaderboard,
            event_bus,
            sessions: SessionRegistry::new(),
            announcer_handle,
            announcer_shutdown,
        }
    }
}
