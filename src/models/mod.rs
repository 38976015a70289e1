// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.
//!
//! Children refer to their parents by id only; collections are resolved
//! through the record store, never held as back-references.

pub mod activity;
pub mod goal;
pub mod task;
pub mod user;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use activity::{Activity, ActivityPatch, ActivityState, NewActivity};
pub use goal::{Goal, GoalPatch, NewGoal};
pub use task::{NewTask, Task, TaskPatch};
pub use user::{CreateUserRequest, User, UserPatch, UserStatus};

/// The entity types held in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Goal,
    Task,
    Activity,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "User",
            EntityKind::Goal => "Goal",
            EntityKind::Task => "Task",
            EntityKind::Activity => "Activity",
        };
        f.write_str(name)
    }
}
