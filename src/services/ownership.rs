// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ownership chain checks (user → goal → task | activity).
//!
//! Every scoped operation resolves its parents here before touching any
//! state. Existence is checked before ownership, and both before any write,
//! so a rejected request leaves the store untouched.

use crate::db::{Record, RecordStore};
use crate::error::{AppError, Result};
use crate::models::{Activity, EntityKind, Goal, Task};

/// The authenticated caller must be the user addressed in the path.
pub fn verify_identity(acting_user: u64, user_id: u64) -> Result<()> {
    if acting_user != user_id {
        tracing::warn!(acting_user, user_id, "Rejected access to another user's resources");
        return Err(AppError::Unauthorized(format!(
            "user {} may not act as user {}",
            acting_user, user_id
        )));
    }
    Ok(())
}

pub fn verify_goal(user_id: u64, goal: &Goal) -> Result<()> {
    if goal.user_id != user_id {
        tracing::warn!(user_id, goal_id = goal.id, "Goal belongs to another user");
        return Err(AppError::Unauthorized(format!(
            "goal {} does not belong to user {}",
            goal.id, user_id
        )));
    }
    Ok(())
}

pub fn verify_task(user_id: u64, goal: &Goal, task: &Task) -> Result<()> {
    verify_child(EntityKind::Task, task.id, task.user_id, task.goal_id, user_id, goal)
}

pub fn verify_activity(user_id: u64, goal: &Goal, activity: &Activity) -> Result<()> {
    verify_child(
        EntityKind::Activity,
        activity.id,
        activity.user_id,
        activity.goal_id,
        user_id,
        goal,
    )
}

/// Owner first, then container: a child reached through the caller's own
/// but wrong goal is a mismatch, not an authorization failure.
fn verify_child(
    kind: EntityKind,
    child_id: u64,
    child_user: u64,
    child_goal: u64,
    user_id: u64,
    goal: &Goal,
) -> Result<()> {
    if child_user != user_id {
        tracing::warn!(entity = %kind, id = child_id, user_id, "Child belongs to another user");
        return Err(AppError::Unauthorized(format!(
            "{} {} does not belong to user {}",
            kind, child_id, user_id
        )));
    }
    if child_goal != goal.id {
        tracing::warn!(
            entity = %kind,
            id = child_id,
            expected_goal = goal.id,
            actual_goal = child_goal,
            "Child addressed through the wrong goal"
        );
        return Err(AppError::OwnershipMismatch {
            child: kind,
            expected_parent: goal.id,
            actual_parent: child_goal,
        });
    }
    Ok(())
}

/// Loads entities along a request path and validates the chain.
#[derive(Clone)]
pub struct OwnershipGuard {
    db: RecordStore,
}

impl OwnershipGuard {
    pub fn new(db: RecordStore) -> Self {
        Self { db }
    }

    /// Resolve `(acting_user, user_id, goal_id)`.
    pub async fn goal(&self, acting_user: u64, user_id: u64, goal_id: u64) -> Result<Goal> {
        verify_identity(acting_user, user_id)?;
        let goal: Goal = self
            .db
            .find_by_id(goal_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Goal, goal_id))?;
        verify_goal(user_id, &goal)?;
        Ok(goal)
    }

    /// Resolve `(acting_user, user_id, goal_id, task_id)`.
    pub async fn task(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
    ) -> Result<(Goal, Task)> {
        let goal = self.goal(acting_user, user_id, goal_id).await?;
        let task: Task = self
            .db
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Task, task_id))?;
        verify_task(user_id, &goal, &task)?;
        Ok((goal, task))
    }

    /// Resolve `(acting_user, user_id, goal_id, activity_id)`.
    pub async fn activity(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
    ) -> Result<(Goal, Activity)> {
        let goal = self.goal(acting_user, user_id, goal_id).await?;
        let activity: Activity = self
            .db
            .find_by_id(activity_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::Activity, activity_id))?;
        verify_activity(user_id, &goal, &activity)?;
        Ok((goal, activity))
    }

    /// Store a new child of `goal_id`, then confirm the goal survived.
    ///
    /// A goal deleted after the guard read it has its cascade racing this
    /// write. Either the cascade's last sweep sees the child, or this check
    /// sees the goal gone and withdraws the child.
    pub async fn attach<T: Record>(&self, goal_id: u64, child: &T) -> Result<T> {
        let child = self.db.create(child).await?;

        if !self.db.exists_by_id::<Goal>(goal_id).await? {
            tracing::warn!(
                entity = %T::KIND,
                id = child.id(),
                goal_id,
                "Goal deleted during create, withdrawing child"
            );
            self.db.delete_by_id::<T>(child.id()).await?;
            return Err(AppError::not_found(EntityKind::Goal, goal_id));
        }
        Ok(child)
    }
}
