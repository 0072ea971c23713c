//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from session workers, the store, and session rules so
//! callers can bubble them up with consistent context, and classifies each
//! into an [`ErrorKind`] for the transport layer.
use game_core::{PlayerId, RosterError, SessionError};
use strum::{Display, IntoStaticStr};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::directory::DirectoryError;
pub use crate::repository::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("no session for player {0}")]
    UnknownSession(PlayerId),

    #[error("session worker command channel closed")]
    SessionClosed,

    #[error("session worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("session worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

/// Failure classes callers act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input. Never retried.
    Validation,
    /// The store is unreachable. The caller may retry.
    StoreUnavailable,
    /// A directory or broadcast call failed.
    ExternalLookup,
    NotFound,
    AlreadyOpponent,
    /// The request is valid but the session state does not allow it.
    Conflict,
    Internal,
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::Validation(_) => ErrorKind::Validation,
            RuntimeError::Store(StoreError::Unavailable(_)) => ErrorKind::StoreUnavailable,
            RuntimeError::Store(_) => ErrorKind::Internal,
            RuntimeError::Session(_) => ErrorKind::Conflict,
            RuntimeError::Roster(RosterError::NotFound(_)) => ErrorKind::NotFound,
            RuntimeError::Roster(RosterError::AlreadyOpponent(_)) => ErrorKind::AlreadyOpponent,
            RuntimeError::Roster(RosterError::IsPlayer(_)) => ErrorKind::Conflict,
            RuntimeError::Directory(_) => ErrorKind::ExternalLookup,
            RuntimeError::UnknownSession(_) | RuntimeError::SessionClosed => ErrorKind::NotFound,
            RuntimeError::ReplyChannelClosed(_) | RuntimeError::WorkerJoin(_) => {
                ErrorKind::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            RuntimeError::Validation("id".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RuntimeError::from(StoreError::Unavailable("down".into())).kind(),
            ErrorKind::StoreUnavailable
        );
        assert_eq!(
            RuntimeError::from(RosterError::AlreadyOpponent(PlayerId(2))).kind(),
            ErrorKind::AlreadyOpponent
        );
        assert_eq!(
            RuntimeError::from(RosterError::NotFound("bob".into())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            RuntimeError::from(SessionError::PlayerDefeated).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            RuntimeError::from(DirectoryError::NotConfigured("key")).kind(),
            ErrorKind::ExternalLookup
        );
        assert_eq!(ErrorKind::StoreUnavailable.to_string(), "store_unavailable");
    }
}
