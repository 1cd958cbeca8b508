//! Login, logout, and the session extractor guarding list routes

use axum::{
    Form,
    extract::{FromRequestParts, Query, State},
    http::{Method, request::Parts},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};
use tracing::{debug, info, warn};

use super::AppState;
use super::error::ApiError;
use crate::templates;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "sidequests_session";

/// Message shown when the submitted credentials don't match
const INVALID_LOGIN: &str = "Invalid username or password.";

/// An authenticated request
///
/// Extracting this rejects requests without a live session: `GET` requests
/// are redirected to the login page with a `next` parameter, everything
/// else gets a 401 JSON error.
#[derive(Debug)]
pub struct AuthSession {
    pub username: String,
}

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = Cookies::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if let Some(cookie) = cookies.get(SESSION_COOKIE)
            && let Some(username) = state.sessions.get_user(cookie.value()).await
        {
            return Ok(Self { username });
        }

        debug!("Rejecting unauthenticated {} {}", parts.method, parts.uri);
        if parts.method == Method::GET {
            let next = parts.uri.path_and_query().map_or("/", |pq| pq.as_str());
            Err(Redirect::to(&login_redirect(next)).into_response())
        } else {
            Err(ApiError::unauthorized().into_response())
        }
    }
}

/// Login URL that returns to `next` after a successful login
pub fn login_redirect(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/login?next={}", encoded)
}

/// Whether `target` is a local path that is safe to redirect to.
///
/// Only absolute paths on this host are accepted. Protocol-relative
/// (`//host`) and backslash (`/\host`) forms are rejected since browsers
/// treat them as off-site.
pub fn is_safe_redirect(target: &str) -> bool {
    let mut chars = target.chars();
    if chars.next() != Some('/') {
        return false;
    }
    if matches!(chars.next(), Some('/') | Some('\\')) {
        return false;
    }
    !target.chars().any(char::is_control)
}

/// Query parameters for the login page
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    next: Option<String>,
}

/// Login form data
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
    next: Option<String>,
}

async fn has_session(state: &AppState, cookies: &Cookies) -> bool {
    match cookies.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.get_user(cookie.value()).await.is_some(),
        None => false,
    }
}

/// Handler for GET /login - Show login page
pub async fn login_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<LoginQuery>,
) -> Response {
    if has_session(&state, &cookies).await {
        return Redirect::to("/").into_response();
    }

    let next = query.next.filter(|n| is_safe_redirect(n));
    Html(templates::login_page(None, next.as_deref())).into_response()
}

/// Handler for POST /login - Check credentials and start a session
pub async fn login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    let next = form.next.filter(|n| is_safe_redirect(n));

    if !state.credentials.verify(&form.username, &form.password) {
        warn!("Failed login attempt for user '{}'", form.username);
        return Html(templates::login_page(Some(INVALID_LOGIN), next.as_deref()))
            .into_response();
    }

    let token = state.sessions.create_session(&form.username).await;
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookies.add(cookie);

    info!("User '{}' logged in", form.username);
    Redirect::to(next.as_deref().unwrap_or("/")).into_response()
}

/// Handler for POST /logout - Destroy the session
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        cookies.remove(removal);
    }
    Redirect::to("/login")
}
