// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal management.

use crate::db::{collections, Filter, RecordStore};
use crate::error::{AppError, Result};
use crate::models::{Activity, EntityKind, Goal, GoalPatch, NewGoal, Task, User};
use crate::services::merge::Merge;
use crate::services::ownership::{verify_identity, OwnershipGuard};
use futures_util::{stream, StreamExt};
use validator::Validate;

const MAX_CONCURRENT_DB_OPS: usize = 50;

#[derive(Clone)]
pub struct GoalService {
    db: RecordStore,
    guard: OwnershipGuard,
}

impl GoalService {
    pub fn new(db: RecordStore) -> Self {
        Self {
            guard: OwnershipGuard::new(db.clone()),
            db,
        }
    }

    pub async fn create(&self, acting_user: u64, user_id: u64, new: NewGoal) -> Result<Goal> {
        new.validate()?;
        verify_identity(acting_user, user_id)?;
        if !self.db.exists_by_id::<User>(user_id).await? {
            return Err(AppError::not_found(EntityKind::User, user_id));
        }

        let goal = Goal {
            id: self.db.next_sequence(collections::GOALS).await?,
            user_id,
            title: new.title,
            description: new.description,
            start_date: new.start_date,
            end_date: new.end_date,
            due_date: new.due_date,
            complete: false,
            progress: new.progress.unwrap_or(0),
            updated_at: chrono::Utc::now(),
        };

        let goal = self.db.create(&goal).await?;
        tracing::info!(user_id, goal_id = goal.id, "Goal created");
        Ok(goal)
    }

    pub async fn list(&self, acting_user: u64, user_id: u64) -> Result<Vec<Goal>> {
        verify_identity(acting_user, user_id)?;
        self.db
            .find_where(&[Filter::id("user_id", user_id)])
            .await
    }

    pub async fn get(&self, acting_user: u64, user_id: u64, goal_id: u64) -> Result<Goal> {
        self.guard.goal(acting_user, user_id, goal_id).await
    }

    pub async fn update(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        patch: GoalPatch,
    ) -> Result<Goal> {
        patch.validate()?;
        let existing = self.guard.goal(acting_user, user_id, goal_id).await?;

        let mut goal = patch.merge(existing);
        goal.updated_at = chrono::Utc::now();

        let goal = self.db.update(&goal).await?;
        tracing::info!(user_id, goal_id, "Goal updated");
        Ok(goal)
    }

    /// Delete a goal together with its tasks and activities.
    ///
    /// Children go first so a failure part-way never leaves a child
    /// pointing at a missing goal. A second sweep after the goal is gone
    /// catches children created while the first one ran.
    pub async fn delete(&self, acting_user: u64, user_id: u64, goal_id: u64) -> Result<()> {
        let goal = self.guard.goal(acting_user, user_id, goal_id).await?;

        let (tasks, activities) = self.delete_children(goal.id).await?;
        self.db.delete_by_id::<Goal>(goal.id).await?;
        let (late_tasks, late_activities) = self.delete_children(goal.id).await?;

        tracing::info!(
            user_id,
            goal_id,
            tasks = tasks + late_tasks,
            activities = activities + late_activities,
            "Goal deleted"
        );
        Ok(())
    }

    /// Delete every task and activity of `goal_id`, returning the counts.
    async fn delete_children(&self, goal_id: u64) -> Result<(usize, usize)> {
        let tasks: Vec<Task> = self
            .db
            .find_where(&[Filter::id("goal_id", goal_id)])
            .await?;
        let activities: Vec<Activity> = self
            .db
            .find_where(&[Filter::id("goal_id", goal_id)])
            .await?;

        let counts = (tasks.len(), activities.len());
        self.delete_all::<Task>(tasks.iter().map(|t| t.id).collect())
            .await?;
        self.delete_all::<Activity>(activities.iter().map(|a| a.id).collect())
            .await?;
        Ok(counts)
    }

    async fn delete_all<T: crate::db::Record>(&self, ids: Vec<u64>) -> Result<()> {
        stream::iter(ids)
            .map(|id| {
                let db = self.db.clone();
                async move { db.delete_by_id::<T>(id).await }
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<()>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>>>()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::UserStatus;
    use chrono::Utc;

    async fn setup() -> (GoalService, MemoryStore) {
        let mem = MemoryStore::new();
        let db = RecordStore::Memory(mem.clone());
        for id in [7, 9] {
            let user = User {
                id,
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                email: format!("user{}@example.com", id),
                password_hash: String::new(),
                status: UserStatus::Active,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            db.create(&user).await.unwrap();
        }
        (GoalService::new(db), mem)
    }

    fn new_goal(title: &str) -> NewGoal {
        NewGoal {
            title: title.to_string(),
            description: None,
            start_date: None,
            end_date: None,
            due_date: None,
            progress: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_scoped_to_owner() {
        let (goals, _) = setup().await;
        goals.create(7, 7, new_goal("Run a marathon")).await.unwrap();
        goals.create(9, 9, new_goal("Learn piano")).await.unwrap();

        let mine = goals.list(7, 7).await.unwrap();

        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Run a marathon");
        assert!(matches!(goals.list(7, 9).await, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_create_for_missing_user() {
        let (goals, _) = setup().await;

        let err = goals.create(5, 5, new_goal("Nothing")).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::NotFound {
                entity: EntityKind::User,
                id: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_foreign_update_leaves_goal_unchanged() {
        let (goals, _) = setup().await;
        let goal = goals.create(7, 7, new_goal("Run a marathon")).await.unwrap();

        let patch = GoalPatch {
            title: Some("Hijacked".to_string()),
            ..Default::default()
        };
        let err = goals.update(9, 9, goal.id, patch).await.unwrap_err();

        assert!(matches!(err, AppError::Unauthorized(_)));
        assert_eq!(goals.get(7, 7, goal.id).await.unwrap(), goal);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_children() {
        let (goals, mem) = setup().await;
        let goal = goals.create(7, 7, new_goal("Run a marathon")).await.unwrap();
        let task = Task {
            id: 1,
            goal_id: goal.id,
            user_id: 7,
            title: "Buy shoes".to_string(),
            description: None,
            start_date: None,
            end_date: None,
            complete: false,
            progress: 0,
            time_spent_secs: 0,
            updated_at: Utc::now(),
        };
        mem.insert(&task).unwrap();

        goals.delete(7, 7, goal.id).await.unwrap();

        assert_eq!(mem.count(collections::GOALS), 0);
        assert_eq!(mem.count(collections::TASKS), 0);
    }

    #[tokio::test]
    async fn test_update_of_concurrently_deleted_goal_is_not_found() {
        let (goals, mem) = setup().await;
        let goal = goals.create(7, 7, new_goal("Run a marathon")).await.unwrap();

        // Read as `update` does, then lose the goal before the write.
        let existing = goals.guard.goal(7, 7, goal.id).await.unwrap();
        goals.delete(7, 7, goal.id).await.unwrap();
        let patch = GoalPatch {
            title: Some("Run two marathons".to_string()),
            ..Default::default()
        };
        let err = goals.db.update(&patch.merge(existing)).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::NotFound {
                entity: EntityKind::Goal,
                ..
            }
        ));
        assert_eq!(mem.count(collections::GOALS), 0);
        assert!(matches!(
            goals.update(7, 7, goal.id, GoalPatch::default()).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
