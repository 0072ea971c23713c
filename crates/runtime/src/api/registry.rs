use std::collections::HashMap;

use game_core::PlayerId;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::handle::SessionHandle;

/// A running session worker.
pub(crate) struct SessionEntry {
    pub handle: SessionHandle,
    pub task: JoinHandle<()>,
}

/// Live sessions keyed by player.
///
/// At most one session per player; inserting a new one hands back the
/// previous entry so the caller can close it.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<PlayerId, SessionEntry>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn insert(&self, entry: SessionEntry) -> Option<SessionEntry> {
        let player = entry.handle.player();
        self.sessions.write().await.insert(player, entry)
    }

    pub async fn get(&self, player: PlayerId) -> Option<SessionHandle> {
        self.sessions
            .read()
            .await
            .get(&player)
            .map(|entry| entry.handle.clone())
    }

    pub(crate) async fn remove(&self, player: PlayerId) -> Option<SessionEntry> {
        self.sessions.write().await.remove(&player)
    }

    pub(crate) async fn drain(&self) -> Vec<SessionEntry> {
        self.sessions.write().await.drain().map(|(_, entry)| entry).collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
