//! In-memory [`GameStore`] for tests and local runs.
//!
//! Values are held under the same keys a networked backend would use, so
//! key-layout expectations can be checked against it. Attack logs are kept
//! as typed [`AttackLog`]s and encoded only when read raw.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use game_core::{AttackEntry, AttackLog, Hp, PlayerId};

use super::keys::{self, WINS_NAMESPACE};
use super::traits::log_limit;
use super::{GameStore, Result, StoreError};

#[derive(Debug, Clone)]
enum Slot {
    Value(String),
    Log(AttackLog),
}

/// In-memory implementation of [`GameStore`].
///
/// All mutations run under one write lock, so `apply_damage` and
/// `increment_wins` are atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    slots: RwLock<HashMap<String, Slot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw string value stored at `key`, if it holds a scalar.
    pub fn raw(&self, key: &str) -> Option<String> {
        let slots = self.slots.read().ok()?;
        match slots.get(key) {
            Some(Slot::Value(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Attack log stored at `key` as the JSON strings a list backend would
    /// hold, newest first.
    pub fn raw_list(&self, key: &str) -> Vec<String> {
        let Ok(slots) = self.slots.read() else {
            return Vec::new();
        };
        match slots.get(key) {
            Some(Slot::Log(log)) => log
                .iter()
                .filter_map(|entry| keys::encode_entry(key, entry).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// All keys currently present, sorted.
    pub fn keys(&self) -> Vec<String> {
        let Ok(slots) = self.slots.read() else {
            return Vec::new();
        };
        let mut keys: Vec<String> = slots.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }

    fn read_value(slots: &HashMap<String, Slot>, key: &str) -> Result<Option<String>> {
        match slots.get(key) {
            None => Ok(None),
            Some(Slot::Value(value)) => Ok(Some(value.clone())),
            Some(Slot::Log(_)) => Err(StoreError::corrupted(key, "expected a value, found a list")),
        }
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn hp(&self, id: PlayerId) -> Result<Hp> {
        let key = keys::hp_key(id);
        let slots = self.slots.read().map_err(|_| StoreError::LockPoisoned)?;
        keys::decode_hp(&key, Self::read_value(&slots, &key)?.as_deref())
    }

    async fn set_hp(&self, id: PlayerId, hp: Hp) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        slots.insert(keys::hp_key(id), Slot::Value(hp.to_string()));
        Ok(())
    }

    async fn apply_damage(&self, id: PlayerId, damage: u32) -> Result<Hp> {
        let key = keys::hp_key(id);
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        let current = keys::decode_hp(&key, Self::read_value(&slots, &key)?.as_deref())?;
        let hp = game_core::apply_damage(current, damage);
        slots.insert(key, Slot::Value(hp.to_string()));
        Ok(hp)
    }

    async fn reset_hp(&self, ids: &[PlayerId]) -> Result<()> {
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        for &id in ids {
            slots.insert(keys::hp_key(id), Slot::Value(Hp::MAX.to_string()));
        }
        Ok(())
    }

    async fn wins(&self, id: PlayerId) -> Result<u64> {
        let key = keys::wins_key(id);
        let slots = self.slots.read().map_err(|_| StoreError::LockPoisoned)?;
        keys::decode_wins(&key, Self::read_value(&slots, &key)?.as_deref())
    }

    async fn increment_wins(&self, id: PlayerId) -> Result<u64> {
        let key = keys::wins_key(id);
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        let wins = keys::decode_wins(&key, Self::read_value(&slots, &key)?.as_deref())? + 1;
        slots.insert(key, Slot::Value(wins.to_string()));
        Ok(wins)
    }

    async fn append_attack(&self, target: PlayerId, entry: &AttackEntry) -> Result<()> {
        let key = keys::attacks_key(target);
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        let slot = slots
            .entry(key.clone())
            .or_insert_with(|| Slot::Log(AttackLog::new()));
        match slot {
            Slot::Log(log) => {
                log.record(entry.clone());
                Ok(())
            }
            Slot::Value(_) => Err(StoreError::corrupted(&key, "expected a list, found a value")),
        }
    }

    async fn recent_attacks(&self, target: PlayerId, limit: usize) -> Result<Vec<AttackEntry>> {
        let key = keys::attacks_key(target);
        let slots = self.slots.read().map_err(|_| StoreError::LockPoisoned)?;
        match slots.get(&key) {
            None => Ok(Vec::new()),
            Some(Slot::Log(log)) => Ok(log.iter().take(log_limit(limit)).cloned().collect()),
            Some(Slot::Value(_)) => Err(StoreError::corrupted(&key, "expected a list, found a value")),
        }
    }

    async fn winner_ids(&self) -> Result<Vec<PlayerId>> {
        let slots = self.slots.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids: Vec<PlayerId> = slots
            .keys()
            .filter_map(|key| keys::parse_id(WINS_NAMESPACE, key))
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use game_core::ATTACK_LOG_CAPACITY;

    use super::*;

    fn entry(damage: u32) -> AttackEntry {
        AttackEntry::new("bob", "Sword", damage, format!("t{damage}"))
    }

    #[tokio::test]
    async fn hp_defaults_to_full_and_persists_as_integer_string() {
        let store = InMemoryStore::new();
        assert_eq!(store.hp(PlayerId(7)).await.unwrap(), Hp::MAX);

        store.set_hp(PlayerId(7), Hp::clamped(75)).await.unwrap();
        assert_eq!(store.raw("hp:7").as_deref(), Some("75"));
        assert_eq!(store.hp(PlayerId(7)).await.unwrap().get(), 75);
    }

    #[tokio::test]
    async fn apply_damage_floors_at_zero() {
        let store = InMemoryStore::new();
        store.set_hp(PlayerId(1), Hp::clamped(15)).await.unwrap();
        assert_eq!(store.apply_damage(PlayerId(1), 20).await.unwrap(), Hp::ZERO);
        assert_eq!(store.raw("hp:1").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let store = InMemoryStore::new();
        store.set_hp(PlayerId(1), Hp::ZERO).await.unwrap();
        store.set_hp(PlayerId(2), Hp::clamped(55)).await.unwrap();
        let ids = [PlayerId(1), PlayerId(2), PlayerId(3)];

        store.reset_hp(&ids).await.unwrap();
        store.reset_hp(&ids).await.unwrap();

        for id in ids {
            assert_eq!(store.hp(id).await.unwrap(), Hp::MAX);
        }
    }

    #[tokio::test]
    async fn wins_increment_from_absent() {
        let store = InMemoryStore::new();
        assert_eq!(store.wins(PlayerId(3)).await.unwrap(), 0);
        assert!(store.winner_ids().await.unwrap().is_empty());

        assert_eq!(store.increment_wins(PlayerId(3)).await.unwrap(), 1);
        assert_eq!(store.increment_wins(PlayerId(3)).await.unwrap(), 2);
        assert_eq!(store.raw("wins:3").as_deref(), Some("2"));
        assert_eq!(store.winner_ids().await.unwrap(), vec![PlayerId(3)]);
    }

    #[tokio::test]
    async fn attack_log_keeps_newest_ten() {
        let store = InMemoryStore::new();
        for damage in 0..25 {
            store.append_attack(PlayerId(9), &entry(damage)).await.unwrap();
        }

        assert_eq!(store.raw_list("attacks:9").len(), ATTACK_LOG_CAPACITY);
        let damages: Vec<u32> = store
            .recent_attacks(PlayerId(9), 10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.damage)
            .collect();
        assert_eq!(damages, (15..25).rev().collect::<Vec<_>>());

        assert_eq!(store.recent_attacks(PlayerId(9), 3).await.unwrap().len(), 3);
        assert!(store.recent_attacks(PlayerId(10), 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupted_values_surface_as_errors() {
        let store = InMemoryStore::new();
        store.append_attack(PlayerId(4), &entry(1)).await.unwrap();
        store
            .slots
            .write()
            .unwrap()
            .insert("hp:4".into(), Slot::Value("many".into()));

        assert!(matches!(
            store.hp(PlayerId(4)).await,
            Err(StoreError::Corrupted { .. })
        ));
    }
}
