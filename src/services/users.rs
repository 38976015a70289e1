// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User signup, login, profile updates and deactivation.

use crate::db::{Filter, RecordStore};
use crate::error::{AppError, Result};
use crate::models::{CreateUserRequest, EntityKind, User, UserPatch, UserStatus};
use crate::services::ids::IdentifierGenerator;
use crate::services::merge::Merge;
use crate::services::ownership::verify_identity;
use crate::services::password::PasswordHasher;
use std::collections::HashSet;
use std::sync::Arc;
use validator::Validate;

/// Generated ids to try before giving up: one full sweep of a host
/// prefix's counter range.
const MAX_ID_ATTEMPTS: u32 = 1 << 16;

#[derive(Clone)]
pub struct UserService {
    db: RecordStore,
    ids: Arc<dyn IdentifierGenerator>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(db: RecordStore, ids: Arc<dyn IdentifierGenerator>, hasher: PasswordHasher) -> Self {
        Self { db, ids, hasher }
    }

    /// Register a new user. The id is taken from the request when an
    /// identity provider assigned one, otherwise minted locally.
    pub async fn signup(&self, request: CreateUserRequest) -> Result<User> {
        let (requested_id, user) = self.prepare(request)?;
        self.ensure_email_free(&user.email, None).await?;

        let user = self.store_new(requested_id, user).await?;
        tracing::info!(user_id = user.id, "User signed up");
        Ok(user)
    }

    /// Register several users at once.
    ///
    /// Every request is validated, and every email checked, before the first
    /// record is written. Writes are not atomic: an id taken concurrently
    /// fails the batch after the earlier users were stored.
    pub async fn signup_batch(&self, requests: Vec<CreateUserRequest>) -> Result<Vec<User>> {
        let mut prepared = Vec::with_capacity(requests.len());
        let mut emails = HashSet::new();
        let mut ids = HashSet::new();

        for request in requests {
            let (requested_id, user) = self.prepare(request)?;
            if !emails.insert(user.email.clone()) {
                return Err(AppError::AlreadyExists {
                    field: "email",
                    value: user.email,
                });
            }
            if let Some(id) = requested_id {
                if !ids.insert(id) {
                    return Err(AppError::AlreadyExists {
                        field: "id",
                        value: id.to_string(),
                    });
                }
            }
            self.ensure_email_free(&user.email, None).await?;
            prepared.push((requested_id, user));
        }

        let mut created = Vec::with_capacity(prepared.len());
        for (requested_id, user) in prepared {
            created.push(self.store_new(requested_id, user).await?);
        }

        tracing::info!(count = created.len(), "Batch signup");
        Ok(created)
    }

    /// Check credentials. Unknown email, wrong password and inactive
    /// account are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let invalid = || AppError::Unauthorized("invalid credentials".to_string());

        let user = self
            .db
            .find_where::<User>(&[Filter::text("email", normalize_email(email))])
            .await?
            .into_iter()
            .next()
            .ok_or_else(invalid)?;

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!(user_id = user.id, "Login with wrong password");
            return Err(invalid());
        }
        if !user.is_active() {
            tracing::warn!(user_id = user.id, "Login attempt on inactive account");
            return Err(invalid());
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(user)
    }

    /// Session check: the token's user must still exist and be active.
    pub async fn ensure_active(&self, user_id: u64) -> Result<()> {
        match self.db.find_by_id::<User>(user_id).await? {
            Some(user) if user.is_active() => Ok(()),
            Some(_) => {
                tracing::warn!(user_id, "Session used after deactivation");
                Err(AppError::Unauthorized("account is inactive".to_string()))
            }
            None => {
                tracing::warn!(user_id, "Session names an unknown user");
                Err(AppError::Unauthorized("unknown user".to_string()))
            }
        }
    }

    pub async fn get(&self, acting_user: u64, user_id: u64) -> Result<User> {
        verify_identity(acting_user, user_id)?;
        self.load(user_id).await
    }

    pub async fn update(&self, acting_user: u64, user_id: u64, mut patch: UserPatch) -> Result<User> {
        patch.validate()?;
        verify_identity(acting_user, user_id)?;
        let existing = self.load(user_id).await?;

        if let Some(email) = patch.email.take() {
            let email = normalize_email(&email);
            if email != existing.email {
                self.ensure_email_free(&email, Some(user_id)).await?;
            }
            patch.email = Some(email);
        }

        let password_hash = match patch.password.take() {
            Some(password) => Some(self.hasher.hash(&password)?),
            None => None,
        };

        let mut user = patch.merge(existing);
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        user.updated_at = chrono::Utc::now();

        let user = self.db.update(&user).await?;
        tracing::info!(user_id, "User profile updated");
        Ok(user)
    }

    /// One-way deactivation. Repeating it is a successful no-op.
    pub async fn deactivate(&self, acting_user: u64, user_id: u64) -> Result<User> {
        verify_identity(acting_user, user_id)?;
        let mut user = self.load(user_id).await?;

        if !user.is_active() {
            tracing::debug!(user_id, "User already inactive");
            return Ok(user);
        }

        user.status = UserStatus::Inactive;
        user.updated_at = chrono::Utc::now();
        let user = self.db.update(&user).await?;
        tracing::info!(user_id, "User deactivated");
        Ok(user)
    }

    /// Validate a signup request and build the user it describes. The id is
    /// filled in by [`store_new`](Self::store_new).
    fn prepare(&self, request: CreateUserRequest) -> Result<(Option<u64>, User)> {
        request.validate()?;
        if request.id == Some(0) {
            return Err(AppError::validation("id", "must be positive"));
        }
        let password = request
            .password
            .as_deref()
            .ok_or_else(|| AppError::validation("password", "required"))?;

        let now = chrono::Utc::now();
        let user = User {
            id: 0,
            first_name: request.first_name,
            last_name: request.last_name,
            email: normalize_email(&request.email),
            password_hash: self.hasher.hash(password)?,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        Ok((request.id, user))
    }

    /// Create-only write. A requested id that is taken is `AlreadyExists`;
    /// a generated id that is taken (e.g. minted again after a restart) is
    /// skipped for the next one.
    async fn store_new(&self, requested_id: Option<u64>, mut user: User) -> Result<User> {
        if let Some(id) = requested_id {
            user.id = id;
            return self.db.create(&user).await;
        }

        for attempt in 1..=MAX_ID_ATTEMPTS {
            user.id = self.ids.generate_id();
            if self.db.insert(&user).await? {
                if attempt > 1 {
                    tracing::info!(user_id = user.id, skipped = attempt - 1, "Skipped taken user ids");
                }
                return Ok(user);
            }
            tracing::debug!(user_id = user.id, "Generated user id already taken");
        }

        Err(anyhow::anyhow!("no free user id after {} attempts", MAX_ID_ATTEMPTS).into())
    }

    async fn load(&self, user_id: u64) -> Result<User> {
        self.db
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::User, user_id))
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<u64>) -> Result<()> {
        let taken = self
            .db
            .find_where::<User>(&[Filter::text("email", email)])
            .await?
            .into_iter()
            .any(|u| Some(u.id) != owner);

        if taken {
            return Err(AppError::AlreadyExists {
                field: "email",
                value: email.to_string(),
            });
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
