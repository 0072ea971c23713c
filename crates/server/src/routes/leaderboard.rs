use axum::Json;
use axum::extract::State;
use game_core::LeaderboardEntry;
use runtime::RuntimeError;
use serde::Serialize;

use super::AppState;
use crate::error::{ApiError, Result};

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
}

pub(crate) async fn get_leaderboard(State(state): State<AppState>) -> Result<Json<LeaderboardResponse>> {
    let leaderboard = state.runtime.leaderboard().await.map_err(|err| match err {
        RuntimeError::Store(source) => ApiError::Store {
            message: "Failed to fetch leaderboard",
            source,
        },
        other => other.into(),
    })?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}
