//! Test infrastructure for HTTP integration tests
//!
//! Each test gets its own database and session store. Requests are driven
//! through the router in-process with `tower::ServiceExt::oneshot`.

use std::path::PathBuf;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use sidequests::{AppState, Credentials, router};
use sidequests_db::Database;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "correct horse";

/// Response status, headers, and body of one request
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Body parsed as JSON
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    /// Body as UTF-8 text
    #[allow(dead_code)]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    /// Value of the `Location` header
    #[allow(dead_code)]
    pub fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }
}

/// Test context containing an isolated database behind the router
pub struct TestContext {
    pub state: AppState,
    pub app: Router,
    pub temp_dir: PathBuf,
}

impl TestContext {
    /// Create a new test context with an isolated database.
    pub async fn new() -> Self {
        let temp_dir = std::env::temp_dir().join(format!(
            "sidequests-api-test-{}-{:?}-{}",
            std::process::id(),
            std::thread::current().id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));

        let db = Database::connect(&temp_dir).await.unwrap();
        db.init().await.unwrap();

        let state = AppState::new(db, Credentials::new(ADMIN_USER, ADMIN_PASS));
        let app = router(state.clone());

        Self {
            state,
            app,
            temp_dir,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Log in with the configured admin credentials and return the
    /// `Cookie` header value for later requests.
    pub async fn login(&self) -> String {
        let body = format!("username={}&password=correct+horse", ADMIN_USER);
        let response = self
            .send(form_request(Method::POST, "/login", &body, None))
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login should set a session cookie")
    }

    /// Create a quest over HTTP and return its id.
    #[allow(dead_code)]
    pub async fn add_quest(&self, cookie: &str, name: &str) -> String {
        let response = self
            .send(form_request(
                Method::POST,
                "/add_list",
                &format!("name={}", name),
                Some(cookie),
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["id"].as_str().unwrap().to_string()
    }

    /// Create an objective over HTTP and return its id.
    #[allow(dead_code)]
    pub async fn add_objective(&self, cookie: &str, quest_id: &str, title: &str) -> String {
        let response = self
            .send(form_request(
                Method::POST,
                &format!("/list/{}/add_task", quest_id),
                &format!("title={}", title),
                Some(cookie),
            ))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.json()["id"].as_str().unwrap().to_string()
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.temp_dir);
    }
}

/// The `name=value` pair of the session cookie set by a response
pub fn session_cookie(response: &TestResponse) -> Option<String> {
    response
        .headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter(|value| value.starts_with(sidequests::routes::SESSION_COOKIE))
        .filter_map(|value| value.split(';').next())
        .map(str::to_string)
        .next()
}

/// A request without a body
pub fn request(method: Method, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// A request with a urlencoded form body
pub fn form_request(method: Method, uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// A request with a JSON body
pub fn json_request(method: Method, uri: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
