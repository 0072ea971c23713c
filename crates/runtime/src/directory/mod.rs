//! External social directory and public broadcast collaborators.
//!
//! Both are rate-limited, fallible and best-effort. Callers log failures and
//! skip or degrade the affected unit of work; game state never depends on
//! them succeeding.
mod memory;
mod neynar;

use async_trait::async_trait;
use game_core::PlayerId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::{LogBroadcaster, StaticDirectory};
pub use neynar::{NeynarClient, NeynarConfig};

/// Player profile as reported by the directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: PlayerId,
    pub username: String,
}

impl Profile {
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }

    /// Name shown in game. The username is used, matching leaderboard rows.
    pub fn name(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("directory returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode directory response: {0}")]
    Decode(String),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Lookup of players and their social graph.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Bulk lookup by id. Unknown ids are omitted from the result.
    async fn lookup(&self, ids: &[PlayerId]) -> Result<Vec<Profile>>;

    /// Players whose username starts with `query`, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Profile>>;

    /// Players that `id` follows.
    async fn following(&self, id: PlayerId, limit: usize) -> Result<Vec<Profile>>;
}

/// Public-post channel for attack announcements.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn publish(&self, text: &str) -> Result<()>;
}

/// Resolve one player's name, falling back to `fid:<id>` on any failure.
pub async fn display_name(directory: &dyn Directory, id: PlayerId) -> String {
    match directory.lookup(&[id]).await {
        Ok(profiles) => {
            if let Some(profile) = profiles.into_iter().find(|p| p.id == id) {
                return profile.name().to_string();
            }
            tracing::debug!("Directory has no profile for player {}", id);
        }
        Err(e) => tracing::warn!("Name lookup for player {} failed: {}", id, e),
    }
    game_core::Combatant::fallback_name(id)
}

/// Pick the search hit for `query`: an exact (case-insensitive) username
/// match if present, otherwise the first result.
pub fn best_match(query: &str, profiles: Vec<Profile>) -> Option<Profile> {
    let exact = profiles
        .iter()
        .position(|p| p.name().eq_ignore_ascii_case(query));
    match exact {
        Some(index) => profiles.into_iter().nth(index),
        None => profiles.into_iter().next(),
    }
}
