// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Goal model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user's tracked objective; container for tasks and activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    /// Store-assigned sequence id (also used as document ID)
    pub id: u64,
    /// Owning user
    pub user_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub complete: bool,
    /// Percent complete (0-100)
    pub progress: u32,
    pub updated_at: DateTime<Utc>,
}

/// Goal creation payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewGoal {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    #[validate(range(max = 100))]
    pub progress: Option<u32>,
}

/// Partial goal update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct GoalPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub complete: Option<bool>,
    #[validate(range(max = 100))]
    pub progress: Option<u32>,
}
