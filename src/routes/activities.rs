// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity routes: CRUD under a goal plus start/stop.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityPatch, NewActivity};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/users/{user_id}/activities", get(list_user_activities))
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/activities",
            get(list_activities).post(create_activity),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/activities/{activity_id}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/activities/{activity_id}/start",
            put(start_activity),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/activities/{activity_id}/stop",
            put(stop_activity),
        )
}

async fn list_user_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<Activity>>> {
    Ok(Json(
        state.activities.list_for_user(auth.user_id, user_id).await?,
    ))
}

async fn list_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
) -> Result<Json<Vec<Activity>>> {
    let activities = state
        .activities
        .list_for_goal(auth.user_id, user_id, goal_id)
        .await?;
    Ok(Json(activities))
}

async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
    Json(new): Json<NewActivity>,
) -> Result<(StatusCode, Json<Activity>)> {
    let activity = state
        .activities
        .create(auth.user_id, user_id, goal_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

async fn get_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, activity_id)): Path<(u64, u64, u64)>,
) -> Result<Json<Activity>> {
    let activity = state
        .activities
        .get(auth.user_id, user_id, goal_id, activity_id)
        .await?;
    Ok(Json(activity))
}

async fn update_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, activity_id)): Path<(u64, u64, u64)>,
    Json(patch): Json<ActivityPatch>,
) -> Result<Json<Activity>> {
    let activity = state
        .activities
        .update(auth.user_id, user_id, goal_id, activity_id, patch)
        .await?;
    Ok(Json(activity))
}

async fn delete_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, activity_id)): Path<(u64, u64, u64)>,
) -> Result<StatusCode> {
    state
        .activities
        .delete(auth.user_id, user_id, goal_id, activity_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, activity_id)): Path<(u64, u64, u64)>,
) -> Result<Json<Activity>> {
    let activity = state
        .activities
        .start(auth.user_id, user_id, goal_id, activity_id)
        .await?;
    Ok(Json(activity))
}

async fn stop_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, activity_id)): Path<(u64, u64, u64)>,
) -> Result<Json<Activity>> {
    let activity = state
        .activities
        .stop(auth.user_id, user_id, goal_id, activity_id)
        .await?;
    Ok(Json(activity))
}
