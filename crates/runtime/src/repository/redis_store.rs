//! Redis-backed [`GameStore`].
//!
//! Uses the shared key layout from [`keys`](super::keys). HP damage runs as a
//! server-side script so concurrent attacks on one target do not lose
//! updates; the log append and trim run in one atomic pipeline.

use async_trait::async_trait;
use game_core::{ATTACK_LOG_CAPACITY, AttackEntry, Hp, PlayerId};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::keys::{self, WINS_NAMESPACE};
use super::traits::log_limit;
use super::{GameStore, Result, StoreError};

const APPLY_DAMAGE_SCRIPT: &str = r"
local raw = redis.call('GET', KEYS[1])
local hp = 100
if raw then hp = tonumber(raw) end
hp = math.max(0, math.min(100, hp) - tonumber(ARGV[1]))
redis.call('SET', KEYS[1], hp)
return hp
";

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Redis implementation of [`GameStore`].
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    damage_script: redis::Script,
}

impl RedisStore {
    /// Connect to the server at `url` (e.g. `redis://:password@localhost:6379`).
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        tracing::info!("Connected to Redis store");
        Ok(Self {
            conn,
            damage_script: redis::Script::new(APPLY_DAMAGE_SCRIPT),
        })
    }
}

#[async_trait]
impl GameStore for RedisStore {
    async fn hp(&self, id: PlayerId) -> Result<Hp> {
        let key = keys::hp_key(id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;
        keys::decode_hp(&key, raw.as_deref())
    }

    async fn set_hp(&self, id: PlayerId, hp: Hp) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(keys::hp_key(id), hp.get()).await?;
        Ok(())
    }

    async fn apply_damage(&self, id: PlayerId, damage: u32) -> Result<Hp> {
        let mut conn = self.conn.clone();
        let hp: i64 = self
            .damage_script
            .key(keys::hp_key(id))
            .arg(damage)
            .invoke_async(&mut conn)
            .await?;
        Ok(Hp::clamped(hp))
    }

    async fn reset_hp(&self, ids: &[PlayerId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        for &id in ids {
            pipe.set(keys::hp_key(id), Hp::MAX.get()).ignore();
        }
        let mut conn = self.conn.clone();
        pipe.query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }

    async fn wins(&self, id: PlayerId) -> Result<u64> {
        let key = keys::wins_key(id);
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(&key).await?;
        keys::decode_wins(&key, raw.as_deref())
    }

    async fn increment_wins(&self, id: PlayerId) -> Result<u64> {
        let mut conn = self.conn.clone();
        let wins: u64 = conn.incr(keys::wins_key(id), 1u64).await?;
        Ok(wins)
    }

    async fn append_attack(&self, target: PlayerId, entry: &AttackEntry) -> Result<()> {
        let key = keys::attacks_key(target);
        let payload = keys::encode_entry(&key, entry)?;
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .lpush(&key, payload)
            .ignore()
            .ltrim(&key, 0, ATTACK_LOG_CAPACITY as isize - 1)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn recent_attacks(&self, target: PlayerId, limit: usize) -> Result<Vec<AttackEntry>> {
        let limit = log_limit(limit);
        if limit == 0 {
            return Ok(Vec::new());
        }
        let key = keys::attacks_key(target);
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(&key, 0, limit as isize - 1).await?;
        Ok(keys::decode_entries(&key, raw))
    }

    async fn winner_ids(&self) -> Result<Vec<PlayerId>> {
        let mut conn = self.conn.clone();
        let mut found = Vec::new();
        {
            let mut iter = conn
                .scan_match::<_, String>(keys::namespace_pattern(WINS_NAMESPACE))
                .await?;
            while let Some(key) = iter.next_item().await {
                found.push(key);
            }
        }
        let mut ids: Vec<PlayerId> = found
            .iter()
            .filter_map(|key| keys::parse_id(WINS_NAMESPACE, key))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
