//! Route table and shared request helpers.
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use game_core::PlayerId;
use runtime::GameRuntime;
use serde::Deserialize;

use crate::error::{ApiError, Result};

mod leaderboard;
mod sessions;
mod store;

pub use store::{StoreAction, StoreCommand, StoreReply, StoreRequest};

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<GameRuntime>,
}

impl AppState {
    pub fn new(runtime: Arc<GameRuntime>) -> Self {
        Self { runtime }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hp", get(store::get_hp))
        .route("/hp/set", post(store::set_hp))
        .route("/hp/reset", post(store::reset_hp))
        .route("/wins", get(store::get_wins))
        .route("/wins/increment", post(store::increment_wins))
        .route("/attack/log", post(store::log_attack))
        .route("/attacks", get(store::get_attacks))
        .route(
            "/store/:action",
            get(store::query_action).post(store::mutate_action),
        )
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        .route("/sessions", post(sessions::start))
        .route("/sessions/:id", get(sessions::view).delete(sessions::close))
        .route("/sessions/:id/attack", post(sessions::attack))
        .route("/sessions/:id/opponents", post(sessions::add_opponent))
        .route("/sessions/:id/reset", post(sessions::reset))
        .with_state(state)
}

/// Player id as sent by clients: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    fn parse(&self) -> Option<PlayerId> {
        match self {
            RawId::Number(raw) => Some(PlayerId(*raw)),
            RawId::Text(text) => text.parse().ok(),
        }
    }
}

pub(crate) fn require_id(field: &str, raw: Option<&RawId>) -> Result<PlayerId> {
    let raw = raw.ok_or_else(|| ApiError::bad_request(format!("{field} is required")))?;
    raw.parse()
        .ok_or_else(|| ApiError::bad_request(format!("{field} must be a non-negative integer")))
}
