//! In-process directory and broadcaster for tests and offline runs.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use game_core::PlayerId;

use super::{Broadcaster, Directory, DirectoryError, Profile, Result};

/// Fixed set of profiles and follow edges.
///
/// Individual ids can be marked as failing lookups, and the whole directory
/// can be taken offline, to exercise degraded paths.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    profiles: HashMap<PlayerId, Profile>,
    following: HashMap<PlayerId, Vec<PlayerId>>,
    failing: HashSet<PlayerId>,
    offline: AtomicBool,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.insert(profile.id, profile);
        self
    }

    pub fn with_following(mut self, id: PlayerId, follows: impl IntoIterator<Item = PlayerId>) -> Self {
        self.following.entry(id).or_default().extend(follows);
        self
    }

    /// Lookups that include `id` fail.
    pub fn failing_lookup(mut self, id: PlayerId) -> Self {
        self.failing.insert(id);
        self
    }

    /// Make every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable("static directory offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn lookup(&self, ids: &[PlayerId]) -> Result<Vec<Profile>> {
        self.ensure_online()?;
        if let Some(id) = ids.iter().find(|id| self.failing.contains(id)) {
            return Err(DirectoryError::Status {
                status: 500,
                body: format!("lookup failed for {id}"),
            });
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.profiles.get(id).cloned())
            .collect())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Profile>> {
        self.ensure_online()?;
        let query = query.to_ascii_lowercase();
        let mut hits: Vec<Profile> = self
            .profiles
            .values()
            .filter(|p| p.name().to_ascii_lowercase().starts_with(&query))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.name().len().cmp(&b.name().len()).then(a.id.cmp(&b.id)));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn following(&self, id: PlayerId, limit: usize) -> Result<Vec<Profile>> {
        self.ensure_online()?;
        Ok(self
            .following
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|followed| self.profiles.get(followed).cloned())
            .take(limit)
            .collect())
    }
}

/// Broadcaster that only writes announcements to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBroadcaster;

#[async_trait]
impl Broadcaster for LogBroadcaster {
    async fn publish(&self, text: &str) -> Result<()> {
        tracing::info!(target: "announcements", "{}", text);
        Ok(())
    }
}
