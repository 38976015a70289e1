// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field-level merge of partial update payloads.
//!
//! A field present in the payload replaces the stored value; an absent
//! field keeps it. Absence can never clear a value, so clients clear text
//! fields by sending an empty string.

use crate::models::{Activity, ActivityPatch, Goal, GoalPatch, Task, TaskPatch, User, UserPatch};

/// Apply a partial update onto a stored entity.
pub trait Merge<T> {
    fn merge(self, existing: T) -> T;
}

fn pick<V>(incoming: Option<V>, existing: V) -> V {
    incoming.unwrap_or(existing)
}

fn pick_opt<V>(incoming: Option<V>, existing: Option<V>) -> Option<V> {
    incoming.or(existing)
}

/// Profile fields only. The password goes through the hasher in the user service.
impl Merge<User> for UserPatch {
    fn merge(self, existing: User) -> User {
        User {
            first_name: pick(self.first_name, existing.first_name),
            last_name: pick(self.last_name, existing.last_name),
            email: pick(self.email, existing.email),
            ..existing
        }
    }
}

impl Merge<Goal> for GoalPatch {
    fn merge(self, existing: Goal) -> Goal {
        Goal {
            title: pick(self.title, existing.title),
            description: pick_opt(self.description, existing.description),
            start_date: pick_opt(self.start_date, existing.start_date),
            end_date: pick_opt(self.end_date, existing.end_date),
            due_date: pick_opt(self.due_date, existing.due_date),
            complete: pick(self.complete, existing.complete),
            progress: pick(self.progress, existing.progress),
            ..existing
        }
    }
}

impl Merge<Task> for TaskPatch {
    fn merge(self, existing: Task) -> Task {
        Task {
            title: pick(self.title, existing.title),
            description: pick_opt(self.description, existing.description),
            start_date: pick_opt(self.start_date, existing.start_date),
            end_date: pick_opt(self.end_date, existing.end_date),
            complete: pick(self.complete, existing.complete),
            progress: pick(self.progress, existing.progress),
            ..existing
        }
    }
}

impl Merge<Activity> for ActivityPatch {
    fn merge(self, existing: Activity) -> Activity {
        Activity {
            title: pick(self.title, existing.title),
            description: pick_opt(self.description, existing.description),
            activity_type: pick_opt(self.activity_type, existing.activity_type),
            complete: pick(self.complete, existing.complete),
            start_date: pick_opt(self.start_date, existing.start_date),
            end_date: pick_opt(self.end_date, existing.end_date),
            ..existing
        }
    }
}
