// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Productivity tracker: goals, tasks and timed activities.
//!
//! This crate provides the backend API. Every goal, task and activity is
//! reachable only by the user who owns it.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::RecordStore;
use services::{
    ActivityService, GoalService, IdentifierGenerator, PasswordHasher, TaskService, UserService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserService,
    pub goals: GoalService,
    pub tasks: TaskService,
    pub activities: ActivityService,
}

impl AppState {
    /// Wire every service onto one record store.
    pub fn new(config: Config, db: RecordStore, ids: Arc<dyn IdentifierGenerator>) -> Self {
        let hasher = PasswordHasher::new(config.password_hash_iterations);
        Self {
            users: UserService::new(db.clone(), ids, hasher),
            goals: GoalService::new(db.clone()),
            tasks: TaskService::new(db.clone()),
            activities: ActivityService::new(db),
            config,
        }
    }
}
