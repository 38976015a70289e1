// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Timed activity model and its start/stop state machine.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// A timed effort session against a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Store-assigned sequence id (also used as document ID)
    pub id: u64,
    pub goal_id: u64,
    /// Owner; always equal to the goal's owner
    pub user_id: u64,
    pub title: String,
    pub description: Option<String>,
    /// Free-form category (FITNESS, LEARNING, ...)
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    /// Planned window
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    /// Actual timing window
    pub start_time: Option<DateTime<Utc>>,
    pub stop_time: Option<DateTime<Utc>>,
    /// `stop_time - start_time` in whole seconds once stopped, otherwise 0
    pub duration_secs: u64,
    pub complete: bool,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every write; used for compare-and-swap saves
    #[serde(default)]
    pub version: u64,
}

/// Derived lifecycle state. Not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActivityState::Idle => "idle",
            ActivityState::Running => "running",
            ActivityState::Stopped => "stopped",
        })
    }
}

impl Activity {
    pub fn state(&self) -> ActivityState {
        match (self.start_time, self.stop_time) {
            (None, _) => ActivityState::Idle,
            (Some(_), None) => ActivityState::Running,
            (Some(_), Some(_)) => ActivityState::Stopped,
        }
    }

    /// Arm the timer. Allowed from any state; a re-start discards the
    /// previous stop so the duration invariant keeps holding.
    pub fn start(&mut self, now: DateTime<Utc>) {
        self.start_time = Some(now);
        self.stop_time = None;
        self.duration_secs = 0;
        self.complete = false;
        self.updated_at = now;
    }

    /// Stop a running timer and record the elapsed whole seconds.
    ///
    /// A clock that reads earlier than the start time (skew between hosts)
    /// stops the timer at its start, so the duration is zero and still
    /// equals `stop_time - start_time`.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        let started = match (self.start_time, self.state()) {
            (Some(started), ActivityState::Running) => started,
            (_, state) => {
                return Err(AppError::InvalidTransition {
                    activity_id: self.id,
                    state: state.to_string(),
                })
            }
        };

        let stopped = now.max(started);
        let elapsed = stopped.signed_duration_since(started).num_seconds();

        self.stop_time = Some(stopped);
        self.duration_secs = u64::try_from(elapsed).unwrap_or(0);
        self.complete = true;
        self.updated_at = now;
        Ok(())
    }
}

/// Activity creation payload. New activities start `Idle`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewActivity {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub activity_type: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Partial activity update. Timing fields only move through start/stop.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ActivityPatch {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 50))]
    pub activity_type: Option<String>,
    pub complete: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_activity() -> Activity {
        Activity {
            id: 1,
            goal_id: 10,
            user_id: 101,
            title: "Morning run".to_string(),
            description: None,
            activity_type: Some("FITNESS".to_string()),
            start_date: None,
            end_date: None,
            start_time: None,
            stop_time: None,
            duration_secs: 0,
            complete: false,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            version: 0,
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_704_103_200 + secs, 0).unwrap()
    }

    #[test]
    fn test_new_activity_is_idle() {
        assert_eq!(make_activity().state(), ActivityState::Idle);
    }

    #[test]
    fn test_start_then_stop_records_duration() {
        let mut activity = make_activity();
        activity.start(at(0));
        assert_eq!(activity.state(), ActivityState::Running);
        assert!(!activity.complete);

        activity.stop(at(95)).unwrap();

        assert_eq!(activity.state(), ActivityState::Stopped);
        assert_eq!(activity.duration_secs, 95);
        assert_eq!(
            activity.duration_secs as i64,
            (activity.stop_time.unwrap() - activity.start_time.unwrap()).num_seconds()
        );
        assert!(activity.complete);
    }

    #[test]
    fn test_stop_before_start_is_rejected() {
        let mut activity = make_activity();
        let before = activity.clone();

        let err = activity.stop(at(10)).unwrap_err();

        assert!(matches!(err, AppError::InvalidTransition { activity_id: 1, .. }));
        assert_eq!(activity, before);
    }

    #[test]
    fn test_double_stop_is_rejected() {
        let mut activity = make_activity();
        activity.start(at(0));
        activity.stop(at(30)).unwrap();

        let err = activity.stop(at(60)).unwrap_err();

        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert_eq!(activity.duration_secs, 30);
    }

    #[test]
    fn test_restart_rearms_stopped_activity() {
        let mut activity = make_activity();
        activity.start(at(0));
        activity.stop(at(30)).unwrap();

        activity.start(at(100));

        assert_eq!(activity.state(), ActivityState::Running);
        assert_eq!(activity.start_time, Some(at(100)));
        assert_eq!(activity.stop_time, None);
        assert_eq!(activity.duration_secs, 0);
        assert!(!activity.complete);
    }

    #[test]
    fn test_double_start_overwrites_start_time() {
        let mut activity = make_activity();
        activity.start(at(0));
        activity.start(at(40));
        activity.stop(at(50)).unwrap();

        assert_eq!(activity.duration_secs, 10);
    }

    #[test]
    fn test_backwards_clock_stops_at_start() {
        let mut activity = make_activity();
        activity.start(at(100));
        activity.stop(at(90)).unwrap();

        assert_eq!(activity.stop_time, activity.start_time);
        assert_eq!(activity.duration_secs, 0);
        assert_eq!(
            activity.duration_secs as i64,
            (activity.stop_time.unwrap() - activity.start_time.unwrap()).num_seconds()
        );
        assert_eq!(activity.state(), ActivityState::Stopped);
    }
}
