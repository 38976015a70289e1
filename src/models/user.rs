//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Activation flag. Deactivation is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// User profile stored in the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Minted by the id generator unless assigned at signup (also used as document ID)
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    /// Unique across all users
    pub email: String,
    /// PBKDF2 hash, never the clear-text password
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Signup payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Externally assigned id (e.g. from an identity provider)
    #[serde(default)]
    pub id: Option<u64>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
}

/// Partial profile update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserPatch {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 8, max = 256))]
    pub password: Option<String>,
}
