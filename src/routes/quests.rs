//! Quest handlers

use axum::{
    Form, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use sidequests_db::Quest;
use tracing::{debug, info};

use super::{ApiResult, AppState, AuthSession, OrderRequest};

/// Form data for creating a quest
#[derive(Debug, Deserialize)]
pub struct AddQuestForm {
    #[serde(default)]
    name: String,
}

/// JSON body for renaming a quest
#[derive(Debug, Deserialize)]
pub struct RenameQuest {
    #[serde(default)]
    name: String,
}

/// GET / - all quests in rank order
pub async fn list_quests(
    _auth: AuthSession,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Quest>>> {
    Ok(Json(state.db.quests().list().await?))
}

/// GET /list/{list_id} - one quest with its objectives
pub async fn view_quest(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let quest = state.db.quests().require(&list_id).await?;
    let objectives = state.db.objectives().list(&list_id).await?;
    Ok(Json(json!({ "quest": quest, "objectives": objectives })))
}

/// POST /add_list
pub async fn add_quest(
    auth: AuthSession,
    State(state): State<AppState>,
    Form(form): Form<AddQuestForm>,
) -> ApiResult<Json<Value>> {
    let quest = state.db.quests().create(&form.name).await?;
    info!("{} created quest {} '{}'", auth.username, quest.id, quest.name);
    Ok(Json(json!({ "id": quest.id, "name": quest.name })))
}

/// DELETE /delete_list/{list_id}
pub async fn delete_quest(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(list_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.db.quests().delete(&list_id).await?;
    info!("{} deleted quest {}", auth.username, list_id);
    Ok(Json(json!({ "success": true })))
}

/// PUT /update_list/{list_id}
pub async fn rename_quest(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(body): Json<RenameQuest>,
) -> ApiResult<Json<Value>> {
    state.db.quests().rename(&list_id, &body.name).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /update_quest_order
pub async fn reorder_quests(
    _auth: AuthSession,
    State(state): State<AppState>,
    Json(body): Json<OrderRequest>,
) -> ApiResult<Json<Value>> {
    let keys = body.into_keys();
    let written = state.db.quests().reorder(&keys).await?;
    debug!("Reordered quests: {} of {} ids applied", written, keys.len());
    Ok(Json(json!({ "success": true })))
}
