//! Bounded, newest-first record of attacks received by a player.

use arrayvec::ArrayVec;

/// Maximum number of entries retained per player log.
pub const ATTACK_LOG_CAPACITY: usize = 10;

/// One attack received by a player.
///
/// `damage` is informational: it has already been applied to HP when the
/// entry is written.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackEntry {
    pub attacker: String,
    pub weapon: String,
    pub damage: u32,
    /// RFC 3339 UTC timestamp.
    pub timestamp: String,
}

impl AttackEntry {
    pub fn new(
        attacker: impl Into<String>,
        weapon: impl Into<String>,
        damage: u32,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            attacker: attacker.into(),
            weapon: weapon.into(),
            damage,
            timestamp: timestamp.into(),
        }
    }
}

/// Attack log holding at most [`ATTACK_LOG_CAPACITY`] entries, newest first.
///
/// Recording an entry when the log is full evicts the oldest one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackLog {
    entries: ArrayVec<AttackEntry, ATTACK_LOG_CAPACITY>,
}

impl AttackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from entries already ordered newest first.
    ///
    /// Anything beyond the capacity is dropped from the old end.
    pub fn from_newest_first(entries: impl IntoIterator<Item = AttackEntry>) -> Self {
        Self {
            entries: entries.into_iter().take(ATTACK_LOG_CAPACITY).collect(),
        }
    }

    /// Prepend `entry`, then keep only the newest entries.
    pub fn record(&mut self, entry: AttackEntry) {
        if self.entries.is_full() {
            self.entries.pop();
        }
        self.entries.insert(0, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&AttackEntry> {
        self.entries.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttackEntry> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<AttackEntry> {
        self.entries.into_iter().collect()
    }
}
