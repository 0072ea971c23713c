//! Key namespaces and value encodings shared by every store backend.
//!
//! Other tooling reads these keys directly, so the layout is fixed:
//!
//! ```text
//! hp:<id>       integer string, read as 100 when absent
//! wins:<id>     integer string, read as 0 when absent
//! attacks:<id>  list of JSON attack entries, newest first, at most 10
//! ```

use game_core::{AttackEntry, Hp, PlayerId};

use super::{Result, StoreError};

pub const HP_NAMESPACE: &str = "hp";
pub const WINS_NAMESPACE: &str = "wins";
pub const ATTACKS_NAMESPACE: &str = "attacks";

pub fn hp_key(id: PlayerId) -> String {
    format!("{HP_NAMESPACE}:{id}")
}

pub fn wins_key(id: PlayerId) -> String {
    format!("{WINS_NAMESPACE}:{id}")
}

pub fn attacks_key(id: PlayerId) -> String {
    format!("{ATTACKS_NAMESPACE}:{id}")
}

/// Pattern matching every key in `namespace`.
pub fn namespace_pattern(namespace: &str) -> String {
    format!("{namespace}:*")
}

/// Extract the player id from a key in `namespace`.
pub fn parse_id(namespace: &str, key: &str) -> Option<PlayerId> {
    key.strip_prefix(namespace)?
        .strip_prefix(':')?
        .parse()
        .ok()
}

/// Decode a stored HP value. Out-of-range integers are clamped.
pub fn decode_hp(key: &str, raw: Option<&str>) -> Result<Hp> {
    match raw {
        None => Ok(Hp::MAX),
        Some(raw) => raw
            .trim()
            .parse::<i64>()
            .map(Hp::clamped)
            .map_err(|e| StoreError::corrupted(key, e)),
    }
}

pub fn decode_wins(key: &str, raw: Option<&str>) -> Result<u64> {
    match raw {
        None => Ok(0),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| StoreError::corrupted(key, e)),
    }
}

pub fn encode_entry(key: &str, entry: &AttackEntry) -> Result<String> {
    serde_json::to_string(entry).map_err(|e| StoreError::corrupted(key, e))
}

/// Decode a raw attack list, skipping entries that are not valid JSON.
pub fn decode_entries<I, S>(key: &str, raw: I) -> Vec<AttackEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .filter_map(|item| match serde_json::from_str(item.as_ref()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping undecodable attack entry in {}: {}", key, e);
                None
            }
        })
        .collect()
}
