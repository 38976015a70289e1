// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Task model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A discrete unit of work under a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned sequence id (also used as document ID)
    pub id: u64,
    pub goal_id: u64,
    /// Owner, denormalized from the goal at creation
    pub user_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub complete: bool,
    pub progress: u32,
    /// Accumulated time spent, in seconds
    pub time_spent_secs: u64,
    pub updated_at: DateTime<Utc>,
}

/// Task creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[validate(range(max = 100))]
    pub progress: Option<u32>,
}

/// Partial task update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub complete: Option<bool>,
    #[validate(range(max = 100))]
    pub progress: Option<u32>,
}
