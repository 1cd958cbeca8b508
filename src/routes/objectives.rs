//! Objective handlers, all scoped by the quest id in the path

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{ApiError, ApiResult, AppState, AuthSession, OrderRequest};

/// Form data for creating an objective
#[derive(Debug, Deserialize)]
pub struct AddObjectiveForm {
    #[serde(default)]
    title: String,
}

/// JSON body for renaming an objective
#[derive(Debug, Deserialize)]
pub struct RenameObjective {
    #[serde(default)]
    title: String,
}

/// POST /list/{list_id}/add_task
pub async fn add_objective(
    auth: AuthSession,
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Form(form): Form<AddObjectiveForm>,
) -> ApiResult<Json<Value>> {
    let objective = state.db.objectives().create(&list_id, &form.title).await?;
    info!(
        "{} added objective {} to quest {}",
        auth.username, objective.id, list_id
    );
    Ok(Json(json!({
        "id": objective.id,
        "title": objective.title,
        "completed": objective.completed,
    })))
}

/// POST /list/{list_id}/complete/{item_id}
pub async fn toggle_objective(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path((list_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let completed = state
        .db
        .objectives()
        .toggle_completion(&list_id, &item_id)
        .await?;
    Ok(Json(json!({ "success": true, "completed": completed })))
}

/// DELETE /list/{list_id}/delete/{item_id}
pub async fn delete_objective(
    auth: AuthSession,
    State(state): State<AppState>,
    Path((list_id, item_id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.db.objectives().delete(&list_id, &item_id).await?;
    info!(
        "{} deleted objective {} from quest {}",
        auth.username, item_id, list_id
    );
    Ok(Json(json!({ "success": true })))
}

/// PUT /update_task/{list_id}/{item_id}
///
/// An objective under a different quest is a bad request here rather than
/// a missing one.
pub async fn rename_objective(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path((list_id, item_id)): Path<(String, String)>,
    Json(body): Json<RenameObjective>,
) -> ApiResult<Json<Value>> {
    state
        .db
        .objectives()
        .rename(&list_id, &item_id, &body.title)
        .await
        .map_err(|e| ApiError::from_db(e, StatusCode::BAD_REQUEST))?;
    Ok(Json(json!({ "success": true })))
}

/// POST /update_objective_order/{list_id}
pub async fn reorder_objectives(
    _auth: AuthSession,
    State(state): State<AppState>,
    Path(list_id): Path<String>,
    Json(body): Json<OrderRequest>,
) -> ApiResult<Json<Value>> {
    let keys = body.into_keys();
    let written = state.db.objectives().reorder(&list_id, &keys).await?;
    debug!(
        "Reordered objectives of quest {}: {} of {} ids applied",
        list_id,
        written,
        keys.len()
    );
    Ok(Json(json!({ "success": true })))
}
