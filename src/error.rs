// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::models::EntityKind;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Service methods raise the specific variant; nothing is retried or
/// swallowed below the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: u64 },

    /// The caller owns both containers but addressed the child through the wrong one.
    #[error("{child} belongs to goal {actual_parent}, not goal {expected_parent}")]
    OwnershipMismatch {
        child: EntityKind,
        expected_parent: u64,
        actual_parent: u64,
    },

    #[error("{field} '{value}' already exists")]
    AlreadyExists { field: &'static str, value: String },

    #[error("Invalid {field}: {rule}")]
    Validation { field: String, rule: String },

    #[error("Activity {activity_id} cannot do that while {state}")]
    InvalidTransition { activity_id: u64, state: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: u64) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn validation(field: impl Into<String>, rule: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            rule: rule.into(),
        }
    }

    /// Stable machine-readable code used in the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::InvalidToken => "invalid_token",
            AppError::NotFound { .. } => "not_found",
            AppError::OwnershipMismatch { .. } => "ownership_mismatch",
            AppError::AlreadyExists { .. } => "already_exists",
            AppError::Validation { .. } => "validation_failed",
            AppError::InvalidTransition { .. } => "invalid_transition",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::OwnershipMismatch { .. } => StatusCode::FORBIDDEN,
            AppError::AlreadyExists { .. }
            | AppError::InvalidTransition { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Report the alphabetically first failing field so responses are stable.
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let rule = errs
                    .first()
                    .map(|e| e.code.to_string())
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_string(), rule)
            })
            .collect();
        fields.sort();

        match fields.into_iter().next() {
            Some((field, rule)) => AppError::Validation { field, rule },
            None => AppError::validation("request", "invalid"),
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let details = match &self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                None
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                None
            }
            AppError::InvalidToken => None,
            other => Some(other.to_string()),
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
