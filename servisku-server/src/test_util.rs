//! Shared helpers for router-level tests
//!
//! Every test gets its own in-memory SQLite database (single-connection
//! pool, so all queries see the same memory file) and drives the real
//! router through `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use servisku_core::{AuthKeys, Claims, ROLE_ADMIN, ROLE_PEGAWAI};

use crate::{build_router, migrations, AppState};

const TEST_SECRET: &[u8] = b"test-secret";

pub(crate) async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrations::run(&pool).await.unwrap();
    AppState::new(pool, AuthKeys::new(TEST_SECRET))
}

pub(crate) async fn test_app() -> (Router, AppState) {
    let state = test_state().await;
    (build_router(state.clone()), state)
}

fn token(role: &str) -> String {
    AuthKeys::new(TEST_SECRET)
        .sign(&Claims::new(1, "tester", role))
        .unwrap()
}

fn build_request(method: &str, uri: &str, body: Option<&str>, role: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(role) = role {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(role)));
    }
    let body = match body {
        Some(b) => Body::from(b.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub(crate) fn public_request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    build_request(method, uri, body, None)
}

pub(crate) fn admin_request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    build_request(method, uri, body, Some(ROLE_ADMIN))
}

pub(crate) fn pegawai_request(method: &str, uri: &str, body: Option<&str>) -> Request<Body> {
    build_request(method, uri, body, Some(ROLE_PEGAWAI))
}

pub(crate) async fn request(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

pub(crate) async fn json_body(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a pegawai-role user through the public signup route
pub(crate) async fn signup_user(app: &Router, username: &str, nama: &str) -> i64 {
    let body = format!(
        r#"{{"nama": "{}", "username": "{}", "password": "rahasia"}}"#,
        nama, username
    );
    let response = request(app, public_request("POST", "/api/signup", Some(&body))).await;
    json_body(response).await["user"]["id_user"].as_i64().unwrap()
}
