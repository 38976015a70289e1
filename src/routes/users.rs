// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, login and profile routes.

use crate::error::Result;
use crate::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use crate::models::{CreateUserRequest, User, UserPatch, UserStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes that do not require a session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/users", post(signup))
        .route("/v1/users/batch", post(signup_batch))
        .route("/v1/sessions", post(login))
}

/// Profile routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/users/{user_id}", get(get_user).put(update_user))
        .route("/v1/users/{user_id}/deactivate", put(deactivate_user))
}

/// Public view of a user. Never carries the password hash.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            active: user.status == UserStatus::Active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Returned by signup and login.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(user.id, &state.config.jwt_signing_key)?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax);

    Ok((
        jar.add(cookie),
        Json(SessionResponse {
            user: user.into(),
            token,
        }),
    ))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let user = state.users.signup(request).await?;
    let (jar, body) = start_session(&state, jar, user)?;
    Ok((StatusCode::CREATED, jar, body))
}

/// Bulk registration for provisioning. No session is started.
async fn signup_batch(
    State(state): State<Arc<AppState>>,
    Json(requests): Json<Vec<CreateUserRequest>>,
) -> Result<(StatusCode, Json<Vec<UserResponse>>)> {
    let users = state.users.signup_batch(requests).await?;
    Ok((
        StatusCode::CREATED,
        Json(users.into_iter().map(UserResponse::from).collect()),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let user = state
        .users
        .authenticate(&request.email, &request.password)
        .await?;
    start_session(&state, jar, user)
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserResponse>> {
    let user = state.users.get(auth.user_id, user_id).await?;
    Ok(Json(user.into()))
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
    Json(patch): Json<UserPatch>,
) -> Result<Json<UserResponse>> {
    let user = state.users.update(auth.user_id, user_id, patch).await?;
    Ok(Json(user.into()))
}

async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(user_id): Path<u64>,
) -> Result<Json<UserResponse>> {
    let user = state.users.deactivate(auth.user_id, user_id).await?;
    Ok(Json(user.into()))
}
