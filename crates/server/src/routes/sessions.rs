//! Session control: start, inspect, attack, add opponents, reset, close.
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use game_core::{Opponent, PlayerId};
use runtime::{AttackReport, SessionView};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{AppState, RawId, require_id};
use crate::error::{ApiError, Result};

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default, alias = "fid")]
    id: Option<RawId>,
}

#[derive(Debug, Deserialize)]
pub struct AttackRequest {
    #[serde(default)]
    target: Option<RawId>,
    #[serde(default)]
    weapon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OpponentRequest {
    #[serde(default)]
    username: Option<String>,
}

fn path_id(raw: &str) -> Result<PlayerId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("id must be a non-negative integer"))
}

pub(crate) async fn start(
    State(state): State<AppState>,
    body: std::result::Result<Json<StartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionView>)> {
    let Json(request) = body?;
    let id = require_id("id", request.id.as_ref())?;

    let session = state.runtime.start_session(id).await?;
    Ok((StatusCode::CREATED, Json(session.view().await?)))
}

pub(crate) async fn view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    let session = state.runtime.session(path_id(&id)?).await?;
    Ok(Json(session.view().await?))
}

pub(crate) async fn attack(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<AttackRequest>, JsonRejection>,
) -> Result<Json<AttackReport>> {
    let id = path_id(&id)?;
    let Json(request) = body?;
    let target = require_id("target", request.target.as_ref())?;
    let weapon = request
        .weapon
        .ok_or_else(|| ApiError::bad_request("weapon is required"))?;

    let session = state.runtime.session(id).await?;
    Ok(Json(session.attack(target, weapon).await?))
}

pub(crate) async fn add_opponent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<OpponentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Opponent>)> {
    let id = path_id(&id)?;
    let Json(request) = body?;
    let username = request
        .username
        .ok_or_else(|| ApiError::bad_request("username is required"))?;

    let session = state.runtime.session(id).await?;
    Ok((StatusCode::CREATED, Json(session.add_opponent(username).await?)))
}

pub(crate) async fn reset(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>> {
    let session = state.runtime.session(path_id(&id)?).await?;
    Ok(Json(session.reset().await?))
}

pub(crate) async fn close(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>> {
    state.runtime.end_session(path_id(&id)?).await?;
    Ok(Json(json!({ "success": true })))
}
