//! JSON error responses
//!
//! Maps store errors onto HTTP status codes with an `{"error": "..."}` body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sidequests_db::DbError;
use tracing::error;

/// Error returned by the list-management handlers
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401 for requests without a valid session
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Login required.")
    }

    /// Map a store error, reporting a scope mismatch with `scope_status`.
    ///
    /// Most routes treat an objective under the wrong quest as not found;
    /// renaming reports it as a bad request instead.
    pub fn from_db(err: DbError, scope_status: StatusCode) -> Self {
        match err {
            DbError::ValidationError { message } => Self::new(StatusCode::BAD_REQUEST, message),
            DbError::NotFound { kind, .. } => {
                Self::new(StatusCode::NOT_FOUND, format!("{} not found.", kind))
            }
            DbError::ScopeMismatch { kind, .. } => Self::new(
                scope_status,
                format!("{} does not belong to the specified quest.", kind),
            ),
            failed @ DbError::Transaction(_) => {
                Self::new(StatusCode::BAD_REQUEST, failed.to_string())
            }
            other => {
                error!("Request failed: {}", other.full_message());
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        Self::from_db(err, StatusCode::NOT_FOUND)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Result type for JSON handlers
pub type ApiResult<T> = Result<T, ApiError>;
