//! Leaderboard ranking.

use crate::state::PlayerId;

/// One ranked row. Derived on demand, never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LeaderboardEntry {
    pub id: PlayerId,
    pub display_name: String,
    pub wins: u64,
}

impl LeaderboardEntry {
    pub fn new(id: PlayerId, display_name: impl Into<String>, wins: u64) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            wins,
        }
    }
}

/// Sort rows by descending win count. Ties keep their input order.
pub fn rank(mut entries: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
    entries.sort_by(|a, b| b.wins.cmp(&a.wins));
    entries
}
