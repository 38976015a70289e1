// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Goal, GoalPatch, NewGoal};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/v1/users/{user_id}/goals",
            get(list_goals).post(create_goal),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
}

async fn list_goals(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<Goal>>> {
    Ok(Json(state.goals.list(auth.user_id, user_id).await?))
}

async fn create_goal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
    Json(new): Json<NewGoal>,
) -> Result<(StatusCode, Json<Goal>)> {
    let goal = state.goals.create(auth.user_id, user_id, new).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

async fn get_goal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
) -> Result<Json<Goal>> {
    Ok(Json(state.goals.get(auth.user_id, user_id, goal_id).await?))
}

async fn update_goal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
    Json(patch): Json<GoalPatch>,
) -> Result<Json<Goal>> {
    let goal = state
        .goals
        .update(auth.user_id, user_id, goal_id, patch)
        .await?;
    Ok(Json(goal))
}

async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
) -> Result<StatusCode> {
    state.goals.delete(auth.user_id, user_id, goal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
