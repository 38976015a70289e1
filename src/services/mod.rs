// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activities;
pub mod goals;
pub mod ids;
pub mod merge;
pub mod ownership;
pub mod password;
pub mod tasks;
pub mod users;

pub use activities::ActivityService;
pub use goals::GoalService;
pub use ids::{HostPrefixGenerator, IdentifierGenerator};
pub use ownership::OwnershipGuard;
pub use password::PasswordHasher;
pub use tasks::TaskService;
pub use users::UserService;
