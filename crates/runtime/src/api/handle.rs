//! Cloneable façade for issuing commands to a session worker.
//!
//! [`SessionHandle`] hides channel plumbing and offers async helpers for
//! attacking, managing the roster, and streaming events.
use tokio::sync::{broadcast, mpsc, oneshot};

use game_core::{Opponent, PlayerId};

use super::errors::{Result, RuntimeError};
use super::views::{AttackReport, SessionView};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to one player's session
#[derive(Clone)]
pub struct SessionHandle {
    player: PlayerId,
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl SessionHandle {
    pub(crate) fn new(player: PlayerId, command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            player,
            command_tx,
            event_bus,
        }
    }

    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// The worker has stopped and no longer accepts commands.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::SessionClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Current session state
    pub async fn view(&self) -> Result<SessionView> {
        self.request(|reply| Command::Snapshot { reply }).await?
    }

    /// Attack an opponent in the roster
    pub async fn attack(&self, target: PlayerId, weapon: impl Into<String>) -> Result<AttackReport> {
        let weapon = weapon.into();
        self.request(|reply| Command::Attack {
            target,
            weapon,
            reply,
        })
        .await?
    }

    /// Add an opponent found by username search
    pub async fn add_opponent(&self, username: impl Into<String>) -> Result<Opponent> {
        let username = username.into();
        self.request(|reply| Command::AddOpponent { username, reply })
            .await?
    }

    /// Reset immediately, cancelling any scheduled reset
    pub async fn reset(&self) -> Result<SessionView> {
        self.request(|reply| Command::Reset { reply }).await?
    }

    /// Stop the worker, cancelling any scheduled reset
    pub async fn close(&self) -> Result<()> {
        self.request(|reply| Command::Close { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// Events from every session are delivered; filter on the player id.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }
}
