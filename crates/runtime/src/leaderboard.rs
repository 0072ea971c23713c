//! Leaderboard aggregation over the win counters.

use std::sync::Arc;

use game_core::{LeaderboardEntry, PlayerId, rank};

use crate::directory::Directory;
use crate::repository::{GameStore, Result};

/// Joins win counters with directory names into a ranked view.
///
/// Computed on demand; nothing is cached here.
#[derive(Clone)]
pub struct Leaderboard {
    store: Arc<dyn GameStore>,
    directory: Arc<dyn Directory>,
}

impl Leaderboard {
    pub fn new(store: Arc<dyn GameStore>, directory: Arc<dyn Directory>) -> Self {
        Self { store, directory }
    }

    /// Ranked rows, most wins first.
    ///
    /// Players whose name lookup fails are left out. Only store failures
    /// are errors; an empty store yields an empty board.
    pub async fn compute(&self) -> Result<Vec<LeaderboardEntry>> {
        let ids = self.store.winner_ids().await?;
        let mut entries = Vec::with_capacity(ids.len());

        for id in ids {
            let wins = self.store.wins(id).await?;
            if wins == 0 {
                continue;
            }
            match self.resolve_name(id).await {
                Some(name) => entries.push(LeaderboardEntry::new(id, name, wins)),
                None => continue,
            }
        }

        Ok(rank(entries))
    }

    async fn resolve_name(&self, id: PlayerId) -> Option<String> {
        match self.directory.lookup(&[id]).await {
            Ok(profiles) => {
                let profile = profiles.into_iter().find(|p| p.id == id);
                if profile.is_none() {
                    tracing::debug!("No directory profile for leaderboard player {}", id);
                }
                profile.map(|p| p.name().to_string())
            }
            Err(e) => {
                tracing::warn!("Skipping leaderboard player {}: {}", id, e);
                None
            }
        }
    }
}
