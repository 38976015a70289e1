// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity management and start/stop timing.
//!
//! Every activity write is a versioned save, so two racing transitions
//! on the same activity cannot both succeed: the loser gets `Conflict`
//! and nothing is written on its behalf.

use crate::db::{collections, Filter, RecordStore};
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityPatch, EntityKind, NewActivity};
use crate::services::merge::Merge;
use crate::services::ownership::{verify_identity, OwnershipGuard};
use validator::Validate;

#[derive(Clone)]
pub struct ActivityService {
    db: RecordStore,
    guard: OwnershipGuard,
}

impl ActivityService {
    pub fn new(db: RecordStore) -> Self {
        Self {
            guard: OwnershipGuard::new(db.clone()),
            db,
        }
    }

    /// Create an activity under a goal. It starts out idle.
    pub async fn create(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        new: NewActivity,
    ) -> Result<Activity> {
        new.validate()?;
        let goal = self.guard.goal(acting_user, user_id, goal_id).await?;

        let activity = Activity {
            id: self.db.next_sequence(collections::ACTIVITIES).await?,
            goal_id: goal.id,
            user_id: goal.user_id,
            title: new.title,
            description: new.description,
            activity_type: new.activity_type,
            start_date: new.start_date,
            end_date: new.end_date,
            start_time: None,
            stop_time: None,
            duration_secs: 0,
            complete: false,
            updated_at: chrono::Utc::now(),
            version: 0,
        };

        let activity = self.guard.attach(goal.id, &activity).await?;
        tracing::info!(user_id, goal_id, activity_id = activity.id, "Activity created");
        Ok(activity)
    }

    pub async fn list_for_goal(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
    ) -> Result<Vec<Activity>> {
        let goal = self.guard.goal(acting_user, user_id, goal_id).await?;
        self.db
            .find_where(&[Filter::id("goal_id", goal.id), Filter::id("user_id", user_id)])
            .await
    }

    pub async fn list_for_user(&self, acting_user: u64, user_id: u64) -> Result<Vec<Activity>> {
        verify_identity(acting_user, user_id)?;
        self.db
            .find_where(&[Filter::id("user_id", user_id)])
            .await
    }

    pub async fn get(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
    ) -> Result<Activity> {
        let (_, activity) = self
            .guard
            .activity(acting_user, user_id, goal_id, activity_id)
            .await?;
        Ok(activity)
    }

    pub async fn update(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
        patch: ActivityPatch,
    ) -> Result<Activity> {
        patch.validate()?;
        let (_, existing) = self
            .guard
            .activity(acting_user, user_id, goal_id, activity_id)
            .await?;

        let expected = existing.version;
        let mut activity = patch.merge(existing);
        activity.updated_at = chrono::Utc::now();

        let activity = self.write(activity, expected).await?;
        tracing::info!(user_id, goal_id, activity_id, "Activity updated");
        Ok(activity)
    }

    pub async fn delete(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
    ) -> Result<()> {
        let (_, activity) = self
            .guard
            .activity(acting_user, user_id, goal_id, activity_id)
            .await?;
        self.db.delete_by_id::<Activity>(activity.id).await?;
        tracing::info!(user_id, goal_id, activity_id, "Activity deleted");
        Ok(())
    }

    /// Start (or restart) the timer.
    pub async fn start(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
    ) -> Result<Activity> {
        let (_, mut activity) = self
            .guard
            .activity(acting_user, user_id, goal_id, activity_id)
            .await?;

        let expected = activity.version;
        let previous = activity.state();
        activity.start(chrono::Utc::now());

        let activity = self.write(activity, expected).await?;
        tracing::info!(
            user_id,
            goal_id,
            activity_id,
            previous = %previous,
            "Activity started"
        );
        Ok(activity)
    }

    /// Stop a running timer. Idle or already-stopped activities are rejected.
    pub async fn stop(
        &self,
        acting_user: u64,
        user_id: u64,
        goal_id: u64,
        activity_id: u64,
    ) -> Result<Activity> {
        let (_, mut activity) = self
            .guard
            .activity(acting_user, user_id, goal_id, activity_id)
            .await?;

        let expected = activity.version;
        activity.stop(chrono::Utc::now())?;

        let activity = self.write(activity, expected).await?;
        tracing::info!(
            user_id,
            goal_id,
            activity_id,
            duration_secs = activity.duration_secs,
            "Activity stopped"
        );
        Ok(activity)
    }

    async fn write(&self, mut activity: Activity, expected_version: u64) -> Result<Activity> {
        activity.version = expected_version + 1;
        if !self.db.save_versioned(&activity, expected_version).await? {
            if !self.db.exists_by_id::<Activity>(activity.id).await? {
                return Err(AppError::not_found(EntityKind::Activity, activity.id));
            }
            tracing::warn!(
                activity_id = activity.id,
                expected_version,
                "Activity changed concurrently; write rejected"
            );
            return Err(AppError::Conflict(format!(
                "activity {} was modified concurrently",
                activity.id
            )));
        }
        Ok(activity)
    }
}
