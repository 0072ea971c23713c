//! Error types raised by store implementations.

use thiserror::Error;

/// Errors surfaced by [`GameStore`](super::GameStore) implementations.
///
/// None of these are retried internally; callers decide whether to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupted value at {key}: {reason}")]
    Corrupted { key: String, reason: String },

    #[error("store lock was poisoned")]
    LockPoisoned,
}

impl StoreError {
    pub(crate) fn corrupted(key: &str, reason: impl ToString) -> Self {
        Self::Corrupted {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
