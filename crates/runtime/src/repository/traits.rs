//! Store contract for mutable per-player game state.

use async_trait::async_trait;
use game_core::{ATTACK_LOG_CAPACITY, AttackEntry, Hp, PlayerId};

use super::Result;

/// Typed access to the three player namespaces: HP, wins and attack logs.
///
/// Every call is a potential suspension point. Implementations do not retry
/// and do not impose timeouts beyond their transport's.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Persisted HP, or full HP when never written.
    async fn hp(&self, id: PlayerId) -> Result<Hp>;

    /// Unconditional overwrite.
    async fn set_hp(&self, id: PlayerId, hp: Hp) -> Result<()>;

    /// Subtract `damage` from the player's HP (floored at 0) and return the
    /// new value.
    ///
    /// The default is a plain read-then-write, so concurrent callers on the
    /// same id can lose updates. Backends with an atomic primitive override it.
    async fn apply_damage(&self, id: PlayerId, damage: u32) -> Result<Hp> {
        let hp = game_core::apply_damage(self.hp(id).await?, damage);
        self.set_hp(id, hp).await?;
        Ok(hp)
    }

    /// Set every listed player back to full HP.
    async fn reset_hp(&self, ids: &[PlayerId]) -> Result<()> {
        for &id in ids {
            self.set_hp(id, Hp::MAX).await?;
        }
        Ok(())
    }

    /// Win count, or 0 when never written.
    async fn wins(&self, id: PlayerId) -> Result<u64>;

    /// Atomically add one win and return the new count.
    async fn increment_wins(&self, id: PlayerId) -> Result<u64>;

    /// Prepend `entry` to the target's log and keep only the newest
    /// [`ATTACK_LOG_CAPACITY`] entries.
    async fn append_attack(&self, target: PlayerId, entry: &AttackEntry) -> Result<()>;

    /// Up to `limit` entries, newest first. Empty when no log exists.
    async fn recent_attacks(&self, target: PlayerId, limit: usize) -> Result<Vec<AttackEntry>>;

    /// Every player with a win counter, in ascending id order.
    async fn winner_ids(&self) -> Result<Vec<PlayerId>>;
}

/// Clamp a requested read size to what a log can hold.
pub(crate) fn log_limit(limit: usize) -> usize {
    limit.min(ATTACK_LOG_CAPACITY)
}
