// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity start/stop over HTTP, including racing stops.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_goal, create_test_app, send, signup};

async fn running_activity() -> (axum::Router, String, u64, u64, u64) {
    let (app, _) = create_test_app();
    let token = signup(&app, 101, "owner@example.com").await;
    let g1 = create_goal(&app, &token, 101, "Run a marathon").await;
    let g2 = create_goal(&app, &token, 101, "Learn piano").await;

    let (status, activity) = send(
        &app,
        Method::POST,
        &format!("/v1/users/101/goals/{}/activities", g1),
        Some(&token),
        Some(json!({"title": "Tempo run", "type": "EXERCISE"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(activity["type"], "EXERCISE");
    assert!(activity["start_time"].is_null());
    let id = activity["id"].as_u64().unwrap();

    let (status, started) = send(
        &app,
        Method::PUT,
        &format!("/v1/users/101/goals/{}/activities/{}/start", g1, id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(started["start_time"].is_string());

    (app, token, g1, g2, id)
}

#[tokio::test]
async fn test_stop_records_duration() {
    let (app, token, g1, _, id) = running_activity().await;

    let (status, stopped) = send(
        &app,
        Method::PUT,
        &format!("/v1/users/101/goals/{}/activities/{}/stop", g1, id),
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stopped["complete"], true);
    assert!(stopped["stop_time"].is_string());
    assert!(stopped["duration_secs"].as_u64().unwrap() < 5);
}

#[tokio::test]
async fn test_second_stop_is_invalid_transition() {
    let (app, token, g1, _, id) = running_activity().await;
    let uri = format!("/v1/users/101/goals/{}/activities/{}/stop", g1, id);

    let (first, _) = send(&app, Method::PUT, &uri, Some(&token), None).await;
    let (second, body) = send(&app, Method::PUT, &uri, Some(&token), None).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"], "invalid_transition");
}

#[tokio::test]
async fn test_stop_through_sibling_goal_leaves_activity_running() {
    let (app, token, g1, g2, id) = running_activity().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/v1/users/101/goals/{}/activities/{}/stop", g2, id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "ownership_mismatch");

    let (_, stored) = send(
        &app,
        Method::GET,
        &format!("/v1/users/101/goals/{}/activities/{}", g1, id),
        Some(&token),
        None,
    )
    .await;
    assert!(stored["stop_time"].is_null());
    assert_eq!(stored["complete"], false);
}

#[tokio::test]
async fn test_concurrent_stops_single_winner() {
    let (app, token, g1, _, id) = running_activity().await;
    let uri = format!("/v1/users/101/goals/{}/activities/{}/stop", g1, id);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let app = app.clone();
            let token = token.clone();
            let uri = uri.clone();
            tokio::spawn(async move { send(&app, Method::PUT, &uri, Some(&token), None).await })
        })
        .collect();

    let mut winners = 0;
    for handle in handles {
        let (status, _) = handle.await.unwrap();
        match status {
            StatusCode::OK => winners += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_restart_clears_stop_fields() {
    let (app, token, g1, _, id) = running_activity().await;
    let base = format!("/v1/users/101/goals/{}/activities/{}", g1, id);

    send(&app, Method::PUT, &format!("{}/stop", base), Some(&token), None).await;
    let (status, restarted) =
        send(&app, Method::PUT, &format!("{}/start", base), Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(restarted["stop_time"].is_null());
    assert_eq!(restarted["duration_secs"], 0);
    assert_eq!(restarted["complete"], false);
}
