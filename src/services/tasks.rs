// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task management under a goal.

use crate::db::{collections, Filter, RecordStore};
use crate::error::Result;
use crate::models::{NewTask, Task, TaskPatch};
use crate::services::merge::Merge;
use crate::services::ownership::OwnershipGuard;
use validator::Validate;

#[derive(Clone)]
pub struct TaskService {
    db: RecordStore,
    guard: OwnershipGuard,
}

impl TaskService {
    pub fn new(db: RecordStore) -> Self {
        Self {
            guard: OwnershipGuard::new(db.clone()),
            db,
        }
    }

    pub async fn create(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        new: NewTask,
    ) -> Result<Task> {
        new.validate()?;
        let goal = self.guard.goal(acting_user, user_id, goal_id).await?;

        let task = Task {
            id: self.db.next_sequence(collections::TASKS).await?,
            goal_id: goal.id,
            user_id: goal.user_id,
            title: new.title,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            complete: false,
            progress: new.progress.unwrap_or(0),
            time_spent_secs: 0,
            updated_at: chrono::Utc::now(),
        };

        let task = self.guard.attach(goal.id, &task).await?;
        tracing::info!(user_id, goal_id, task_id = task.id, "Task created");
        Ok(task)
    }

    pub async fn list(&self, acting_user: u64, user_id: u64, goal_id: u64) -> Result<Vec<Task>> {
        let goal = self.guard.goal(acting_user, user_id, goal_id).await?;
        self.db
            .find_where(&[Filter::id("goal_id", goal.id), Filter::id("user_id", user_id)])
            .await
    }

    pub async fn get(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
    ) -> Result<Task> {
        let (_, task) = self
            .guard
            .task(acting_user, user_id, goal_id, task_id)
            .await?;
        Ok(task)
    }

    pub async fn update(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
        patch: TaskPatch,
    ) -> Result<Task> {
        patch.validate()?;
        let (_, existing) = self
            .guard
            .task(acting_user, user_id, goal_id, task_id)
            .await?;

        let mut task = patch.merge(existing);
        task.updated_at = chrono::Utc::now();

        let task = self.db.update(&task).await?;
        tracing::info!(user_id, goal_id, task_id, "Task updated");
        Ok(task)
    }

    pub async fn delete(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
    ) -> Result<()> {
        let (_, task) = self
            .guard
            .task(acting_user, user_id, goal_id, task_id)
            .await?;
        self.db.delete_by_id::<Task>(task.id).await?;
        tracing::info!(user_id, goal_id, task_id, "Task deleted");
        Ok(())
    }

    /// Add `seconds` to the task's accumulated time.
    pub async fn record_time_spent(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
        seconds: u64,
    ) -> Result<Task> {
        let (_, mut task) = self
            .guard
            .task(acting_user, user_id, goal_id, task_id)
            .await?;

        task.time_spent_secs = task.time_spent_secs.saturating_add(seconds);
        task.updated_at = chrono::Utc::now();

        let task = self.db.update(&task).await?;
        tracing::info!(
            user_id,
            task_id,
            added = seconds,
            total = task.time_spent_secs,
            "Task time recorded"
        );
        Ok(task)
    }

    pub async fn set_complete(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        task_id: u64,
        complete: bool,
    ) -> Result<Task> {
        let (_, mut task) = self
            .guard
            .task(acting_user, user_id, goal_id, task_id)
            .await?;

        task.complete = complete;
        task.updated_at = chrono::Utc::now();

        let task = self.db.update(&task).await?;
        tracing::info!(user_id, task_id, complete, "Task completion set");
        Ok(task)
    }
}
