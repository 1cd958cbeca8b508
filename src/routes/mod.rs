//! HTTP routes
//!
//! Every list-management route requires an [`auth::AuthSession`]. Handlers
//! are thin: they parse the request, call the store, and shape the JSON.

pub mod auth;
pub mod error;
mod objectives;
mod quests;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use sidequests_db::Database;
use tower_cookies::CookieManagerLayer;

use crate::config::Credentials;
use crate::session::SessionStore;

pub use auth::{AuthSession, SESSION_COOKIE};
pub use error::{ApiError, ApiResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: SessionStore,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(db: Database, credentials: Credentials) -> Self {
        Self {
            db: Arc::new(db),
            sessions: SessionStore::new(),
            credentials: Arc::new(credentials),
        }
    }
}

/// A record key as submitted in an ordering request.
///
/// Clients may send keys as JSON strings or as bare integers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Text(String),
    Number(i64),
}

impl RecordKey {
    pub fn into_key(self) -> String {
        match self {
            RecordKey::Text(key) => key,
            RecordKey::Number(n) => n.to_string(),
        }
    }
}

/// Body of the reorder endpoints
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    #[serde(default)]
    ordered_ids: Vec<RecordKey>,
}

impl OrderRequest {
    pub fn into_keys(self) -> Vec<String> {
        self.ordered_ids
            .into_iter()
            .map(RecordKey::into_key)
            .collect()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(quests::list_quests))
        .route("/add_list", post(quests::add_quest))
        .route("/list/{list_id}", get(quests::view_quest))
        .route("/delete_list/{list_id}", delete(quests::delete_quest))
        .route("/update_list/{list_id}", put(quests::rename_quest))
        .route("/update_quest_order", post(quests::reorder_quests))
        .route("/list/{list_id}/add_task", post(objectives::add_objective))
        .route(
            "/list/{list_id}/complete/{item_id}",
            post(objectives::toggle_objective),
        )
        .route(
            "/list/{list_id}/delete/{item_id}",
            delete(objectives::delete_objective),
        )
        .route(
            "/update_task/{list_id}/{item_id}",
            put(objectives::rename_objective),
        )
        .route(
            "/update_objective_order/{list_id}",
            post(objectives::reorder_objectives),
        )
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", post(auth::logout))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
