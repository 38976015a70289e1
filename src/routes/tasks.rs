// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task routes, nested under a goal.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{NewTask, Task, TaskPatch};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/tasks",
            get(list_tasks).post(create_task),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/tasks/{task_id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/tasks/{task_id}/time",
            put(record_time),
        )
        .route(
            "/v1/users/{user_id}/goals/{goal_id}/tasks/{task_id}/complete",
            put(set_complete),
        )
}

#[derive(Deserialize)]
struct TimeSpent {
    seconds: u64,
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default = "default_complete")]
    complete: bool,
}

fn default_complete() -> bool {
    true
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
) -> Result<Json<Vec<Task>>> {
    Ok(Json(state.tasks.list(auth.user_id, user_id, goal_id).await?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id)): Path<(u64, u64)>,
    Json(new): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = state
        .tasks
        .create(auth.user_id, user_id, goal_id, new)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, task_id)): Path<(u64, u64, u64)>,
) -> Result<Json<Task>> {
    let task = state
        .tasks
        .get(auth.user_id, user_id, goal_id, task_id)
        .await?;
    Ok(Json(task))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, task_id)): Path<(u64, u64, u64)>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>> {
    let task = state
        .tasks
        .update(auth.user_id, user_id, goal_id, task_id, patch)
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, task_id)): Path<(u64, u64, u64)>,
) -> Result<StatusCode> {
    state
        .tasks
        .delete(auth.user_id, user_id, goal_id, task_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn record_time(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, task_id)): Path<(u64, u64, u64)>,
    Json(body): Json<TimeSpent>,
) -> Result<Json<Task>> {
    let task = state
        .tasks
        .record_time_spent(auth.user_id, user_id, goal_id, task_id, body.seconds)
        .await?;
    Ok(Json(task))
}

async fn set_complete(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((user_id, goal_id, task_id)): Path<(u64, u64, u64)>,
    Json(body): Json<Completion>,
) -> Result<Json<Task>> {
    let task = state
        .tasks
        .set_complete(auth.user_id, user_id, goal_id, task_id, body.complete)
        .await?;
    Ok(Json(task))
}
