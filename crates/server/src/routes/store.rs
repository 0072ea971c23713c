//! Raw store operations.
//!
//! Every request is validated into a [`StoreCommand`] before anything
//! touches the store, then dispatched to one function per variant. The
//! dedicated routes (`/hp`, `/wins/increment`, ...) and the
//! `/store/:action` route share that path.
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use game_core::{ATTACK_LOG_CAPACITY, AttackEntry, Hp, PlayerId};
use runtime::GameStore;
use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};

use super::{AppState, RawId, require_id};
use crate::error::{ApiError, Result};

/// Operation names accepted by `/store/:action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum StoreAction {
    GetHp,
    SetHp,
    ResetHp,
    GetWins,
    IncrementWins,
    LogAttack,
    GetAttacks,
}

impl StoreAction {
    /// Served over GET; the rest are POST.
    pub fn is_query(self) -> bool {
        matches!(self, Self::GetHp | Self::GetWins | Self::GetAttacks)
    }
}

/// Unvalidated request fields. Which ones are required depends on the action.
#[derive(Debug, Default, Deserialize)]
pub struct StoreRequest {
    #[serde(default, alias = "fid")]
    pub id: Option<RawId>,
    #[serde(default, alias = "fids")]
    pub ids: Option<Vec<RawId>>,
    #[serde(default)]
    pub hp: Option<i64>,
    #[serde(default)]
    pub attack: Option<AttackEntry>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default, alias = "fid")]
    id: Option<String>,
}

impl From<IdQuery> for StoreRequest {
    fn from(query: IdQuery) -> Self {
        StoreRequest {
            id: query.id.map(RawId::Text),
            ..Default::default()
        }
    }
}

/// A validated store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    GetHp { id: PlayerId },
    SetHp { id: PlayerId, hp: Hp },
    ResetHp { ids: Vec<PlayerId> },
    GetWins { id: PlayerId },
    IncrementWins { id: PlayerId },
    LogAttack { id: PlayerId, attack: AttackEntry },
    RecentAttacks { id: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StoreReply {
    Hp { hp: Hp },
    Wins { wins: u64 },
    Attacks { attacks: Vec<AttackEntry> },
    Incremented { success: bool, wins: u64 },
    Success { success: bool },
}

impl StoreReply {
    const OK: Self = StoreReply::Success { success: true };
}

impl StoreCommand {
    pub fn parse(action: StoreAction, request: StoreRequest) -> Result<Self> {
        let id = || require_id("id", request.id.as_ref());
        let command = match action {
            StoreAction::GetHp => StoreCommand::GetHp { id: id()? },
            StoreAction::GetWins => StoreCommand::GetWins { id: id()? },
            StoreAction::GetAttacks => StoreCommand::RecentAttacks { id: id()? },
            StoreAction::IncrementWins => StoreCommand::IncrementWins { id: id()? },
            StoreAction::SetHp => {
                let (Some(_), Some(hp)) = (&request.id, request.hp) else {
                    return Err(ApiError::bad_request("id and hp are required"));
                };
                if !(0..=i64::from(Hp::MAX.get())).contains(&hp) {
                    return Err(ApiError::bad_request(format!(
                        "hp must be between 0 and {}",
                        Hp::MAX
                    )));
                }
                StoreCommand::SetHp {
                    id: id()?,
                    hp: Hp::clamped(hp),
                }
            }
            StoreAction::ResetHp => {
                let raw = request
                    .ids
                    .as_ref()
                    .ok_or_else(|| ApiError::bad_request("ids array is required"))?;
                let ids = raw
                    .iter()
                    .map(|raw| require_id("ids", Some(raw)))
                    .collect::<Result<Vec<_>>>()?;
                StoreCommand::ResetHp { ids }
            }
            StoreAction::LogAttack => {
                let (Some(_), Some(attack)) = (&request.id, request.attack.clone()) else {
                    return Err(ApiError::bad_request("id and attack are required"));
                };
                StoreCommand::LogAttack { id: id()?, attack }
            }
        };
        Ok(command)
    }

    /// Client-facing message when the store fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            StoreCommand::GetHp { .. } => "Failed to fetch HP",
            StoreCommand::SetHp { .. } => "Failed to set HP",
            StoreCommand::ResetHp { .. } => "Failed to reset HP",
            StoreCommand::GetWins { .. } => "Failed to fetch wins",
            StoreCommand::IncrementWins { .. } => "Failed to increment wins",
            StoreCommand::LogAttack { .. } => "Failed to log attack",
            StoreCommand::RecentAttacks { .. } => "Failed to fetch attacks",
        }
    }

    pub async fn execute(self, store: &dyn GameStore) -> Result<StoreReply> {
        let message = self.failure_message();
        let reply = match self {
            StoreCommand::GetHp { id } => get_hp_of(store, id).await,
            StoreCommand::SetHp { id, hp } => set_hp_of(store, id, hp).await,
            StoreCommand::ResetHp { ids } => reset_hp_of(store, &ids).await,
            StoreCommand::GetWins { id } => get_wins_of(store, id).await,
            StoreCommand::IncrementWins { id } => increment_wins_of(store, id).await,
            StoreCommand::LogAttack { id, attack } => log_attack_for(store, id, &attack).await,
            StoreCommand::RecentAttacks { id } => recent_attacks_of(store, id).await,
        };
        reply.map_err(ApiError::store(message))
    }
}

type StoreResult = runtime::repository::Result<StoreReply>;

async fn get_hp_of(store: &dyn GameStore, id: PlayerId) -> StoreResult {
    Ok(StoreReply::Hp {
        hp: store.hp(id).await?,
    })
}

async fn set_hp_of(store: &dyn GameStore, id: PlayerId, hp: Hp) -> StoreResult {
    store.set_hp(id, hp).await?;
    Ok(StoreReply::OK)
}

async fn reset_hp_of(store: &dyn GameStore, ids: &[PlayerId]) -> StoreResult {
    store.reset_hp(ids).await?;
    Ok(StoreReply::OK)
}

async fn get_wins_of(store: &dyn GameStore, id: PlayerId) -> StoreResult {
    Ok(StoreReply::Wins {
        wins: store.wins(id).await?,
    })
}

async fn increment_wins_of(store: &dyn GameStore, id: PlayerId) -> StoreResult {
    let wins = store.increment_wins(id).await?;
    Ok(StoreReply::Incremented {
        success: true,
        wins,
    })
}

async fn log_attack_for(store: &dyn GameStore, id: PlayerId, attack: &AttackEntry) -> StoreResult {
    store.append_attack(id, attack).await?;
    Ok(StoreReply::OK)
}

async fn recent_attacks_of(store: &dyn GameStore, id: PlayerId) -> StoreResult {
    Ok(StoreReply::Attacks {
        attacks: store.recent_attacks(id, ATTACK_LOG_CAPACITY).await?,
    })
}

async fn run(state: &AppState, action: StoreAction, request: StoreRequest) -> Result<Json<StoreReply>> {
    let command = StoreCommand::parse(action, request)?;
    tracing::debug!("Store command {:?}", command);
    Ok(Json(command.execute(state.runtime.store().as_ref()).await?))
}

type QueryInput = std::result::Result<Query<IdQuery>, QueryRejection>;
type JsonInput = std::result::Result<Json<StoreRequest>, JsonRejection>;

pub(crate) async fn get_hp(State(state): State<AppState>, query: QueryInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::GetHp, query?.0.into()).await
}

pub(crate) async fn get_wins(State(state): State<AppState>, query: QueryInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::GetWins, query?.0.into()).await
}

pub(crate) async fn get_attacks(State(state): State<AppState>, query: QueryInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::GetAttacks, query?.0.into()).await
}

pub(crate) async fn set_hp(State(state): State<AppState>, body: JsonInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::SetHp, body?.0).await
}

pub(crate) async fn reset_hp(State(state): State<AppState>, body: JsonInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::ResetHp, body?.0).await
}

pub(crate) async fn increment_wins(State(state): State<AppState>, body: JsonInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::IncrementWins, body?.0).await
}

pub(crate) async fn log_attack(State(state): State<AppState>, body: JsonInput) -> Result<Json<StoreReply>> {
    run(&state, StoreAction::LogAttack, body?.0).await
}

fn parse_action(raw: &str, query: bool) -> Result<StoreAction> {
    raw.parse::<StoreAction>()
        .ok()
        .filter(|action| action.is_query() == query)
        .ok_or_else(|| ApiError::bad_request("Invalid action"))
}

pub(crate) async fn query_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    query: QueryInput,
) -> Result<Json<StoreReply>> {
    let action = parse_action(&action, true)?;
    run(&state, action, query?.0.into()).await
}

pub(crate) async fn mutate_action(
    State(state): State<AppState>,
    Path(action): Path<String>,
    body: JsonInput,
) -> Result<Json<StoreReply>> {
    let action = parse_action(&action, false)?;
    run(&state, action, body?.0).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> StoreRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn set_hp_requires_both_fields_in_range() {
        assert!(StoreCommand::parse(StoreAction::SetHp, request(serde_json::json!({"id": 1}))).is_err());
        assert!(
            StoreCommand::parse(StoreAction::SetHp, request(serde_json::json!({"id": 1, "hp": 101})))
                .is_err()
        );
        assert_eq!(
            StoreCommand::parse(StoreAction::SetHp, request(serde_json::json!({"fid": "1", "hp": 0})))
                .unwrap(),
            StoreCommand::SetHp {
                id: PlayerId(1),
                hp: Hp::ZERO
            }
        );
    }

    #[test]
    fn reset_hp_validates_every_id() {
        assert_eq!(
            StoreCommand::parse(StoreAction::ResetHp, request(serde_json::json!({"ids": [1, "2"]})))
                .unwrap(),
            StoreCommand::ResetHp {
                ids: vec![PlayerId(1), PlayerId(2)]
            }
        );
        assert!(
            StoreCommand::parse(StoreAction::ResetHp, request(serde_json::json!({"ids": [1, "x"]})))
                .is_err()
        );
        assert!(StoreCommand::parse(StoreAction::ResetHp, request(serde_json::json!({}))).is_err());
    }

    #[test]
    fn action_names_are_kebab_case_and_method_bound() {
        assert_eq!(parse_action("get-hp", true).unwrap(), StoreAction::GetHp);
        assert_eq!(parse_action("log-attack", false).unwrap(), StoreAction::LogAttack);
        assert!(parse_action("get-hp", false).is_err());
        assert!(parse_action("drop-all", false).is_err());
    }

    #[test]
    fn replies_have_flat_shapes() {
        assert_eq!(
            serde_json::to_value(StoreReply::Hp { hp: Hp::MAX }).unwrap(),
            serde_json::json!({"hp": 100})
        );
        assert_eq!(
            serde_json::to_value(StoreReply::OK).unwrap(),
            serde_json::json!({"success": true})
        );
    }
}
