// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use productivity_tracker::config::Config;
use productivity_tracker::db::{FirestoreDb, RecordStore};
use productivity_tracker::routes::create_router;
use productivity_tracker::services::HostPrefixGenerator;
use productivity_tracker::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> RecordStore {
    RecordStore::Firestore(
        FirestoreDb::new("test-project")
            .await
            .expect("Failed to connect to Firestore emulator"),
    )
}

/// Create a test app over a fresh in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_store(RecordStore::memory())
}

/// Create a test app whose store cannot be reached.
#[allow(dead_code)]
pub fn create_offline_app() -> (Router, Arc<AppState>) {
    create_test_app_with_store(RecordStore::Firestore(FirestoreDb::new_offline()))
}

#[allow(dead_code)]
fn create_test_app_with_store(db: RecordStore) -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let ids = Arc::new(HostPrefixGenerator::with_prefix(1));
    let state = Arc::new(AppState::new(config, db, ids));
    (create_router(state.clone()), state)
}

/// Create a session token the way login does.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, state: &AppState) -> String {
    productivity_tracker::middleware::auth::create_jwt(user_id, &state.config.jwt_signing_key)
        .unwrap()
}

/// Send a JSON request and return status plus parsed body (`Null` when empty).
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Sign up a user with a fixed id and return its session token.
#[allow(dead_code)]
pub async fn signup(app: &Router, id: u64, email: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/v1/users",
        None,
        Some(json!({
            "id": id,
            "first_name": "Test",
            "last_name": "User",
            "email": email,
            "password": "correct-horse-battery",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// Create a goal through the API and return its id.
#[allow(dead_code)]
pub async fn create_goal(app: &Router, token: &str, user_id: u64, title: &str) -> u64 {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/v1/users/{}/goals", user_id),
        Some(token),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "goal create failed: {}", body);
    body["id"].as_u64().unwrap()
}
