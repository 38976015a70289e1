// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership chain enforcement over HTTP.
//!
//! User 101 owns goals g1 and g2; user 202 owns nothing of theirs.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_goal, create_test_app, send, signup};

struct Fixture {
    app: axum::Router,
    owner: String,
    intruder: String,
    g1: u64,
    g2: u64,
}

async fn fixture() -> Fixture {
    let (app, _) = create_test_app();
    let owner = signup(&app, 101, "owner@example.com").await;
    let intruder = signup(&app, 202, "intruder@example.com").await;
    let g1 = create_goal(&app, &owner, 101, "Run a marathon").await;
    let g2 = create_goal(&app, &owner, 101, "Learn piano").await;
    Fixture {
        app,
        owner,
        intruder,
        g1,
        g2,
    }
}

#[tokio::test]
async fn test_token_user_must_match_path_user() {
    let f = fixture().await;

    let (status, body) = send(
        &f.app,
        Method::GET,
        &format!("/v1/users/101/goals/{}", f.g1),
        Some(&f.intruder),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_foreign_goal_under_own_path_is_unauthorized() {
    let f = fixture().await;

    let (status, _) = send(
        &f.app,
        Method::GET,
        &format!("/v1/users/202/goals/{}", f.g1),
        Some(&f.intruder),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_goal_is_not_found() {
    let f = fixture().await;

    let (status, body) = send(
        &f.app,
        Method::GET,
        "/v1/users/101/goals/9999",
        Some(&f.owner),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_task_through_sibling_goal_is_forbidden() {
    let f = fixture().await;
    let (status, task) = send(
        &f.app,
        Method::POST,
        &format!("/v1/users/101/goals/{}/tasks", f.g1),
        Some(&f.owner),
        Some(json!({"title": "Buy shoes"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = task["id"].as_u64().unwrap();

    let (status, body) = send(
        &f.app,
        Method::PUT,
        &format!("/v1/users/101/goals/{}/tasks/{}", f.g2, task_id),
        Some(&f.owner),
        Some(json!({"title": "Moved"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ownership_mismatch");

    let (_, stored) = send(
        &f.app,
        Method::GET,
        &format!("/v1/users/101/goals/{}/tasks/{}", f.g1, task_id),
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(stored["title"], "Buy shoes");
}

#[tokio::test]
async fn test_partial_update_keeps_unsent_fields() {
    let f = fixture().await;

    let (status, goal) = send(
        &f.app,
        Method::PUT,
        &format!("/v1/users/101/goals/{}", f.g1),
        Some(&f.owner),
        Some(json!({"description": "Sub four hours"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(goal["title"], "Run a marathon");
    assert_eq!(goal["description"], "Sub four hours");
    assert_eq!(goal["user_id"], 101);
}

#[tokio::test]
async fn test_goal_delete_cascades() {
    let f = fixture().await;
    let (_, activity) = send(
        &f.app,
        Method::POST,
        &format!("/v1/users/101/goals/{}/activities", f.g1),
        Some(&f.owner),
        Some(json!({"title": "Long run"})),
    )
    .await;
    let activity_id = activity["id"].as_u64().unwrap();

    let (status, _) = send(
        &f.app,
        Method::DELETE,
        &format!("/v1/users/101/goals/{}", f.g1),
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, remaining) = send(&f.app, Method::GET, "/v1/users/101/activities", Some(&f.owner), None).await;
    assert!(remaining
        .as_array()
        .unwrap()
        .iter()
        .all(|a| a["id"].as_u64() != Some(activity_id)));

    let (_, goals) = send(&f.app, Method::GET, "/v1/users/101/goals", Some(&f.owner), None).await;
    assert_eq!(goals.as_array().unwrap().len(), 1);
    assert_eq!(goals[0]["id"].as_u64(), Some(f.g2));
}

#[tokio::test]
async fn test_deactivated_user_cannot_log_in() {
    let f = fixture().await;

    let (status, body) = send(
        &f.app,
        Method::PUT,
        "/v1/users/101/deactivate",
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["active"], false);

    let (status, _) = send(
        &f.app,
        Method::POST,
        "/v1/sessions",
        None,
        Some(json!({"email": "owner@example.com", "password": "correct-horse-battery"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_validation_and_duplicates() {
    let f = fixture().await;

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/v1/users",
        None,
        Some(json!({
            "first_name": "No",
            "last_name": "Email",
            "email": "not-an-email",
            "password": "long-enough-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_failed");

    let (status, body) = send(
        &f.app,
        Method::POST,
        "/v1/users",
        None,
        Some(json!({
            "first_name": "Dup",
            "last_name": "Licate",
            "email": "Owner@Example.com",
            "password": "long-enough-password",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_exists");
}
