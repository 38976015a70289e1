// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Every entity type lives in its own collection keyed by its id:
//! - `users`, `goals`, `tasks`, `activities`
//! - `sequences` (one counter document per collection)

use crate::db::{collections, FieldValue, Filter, Record, Versioned};
use crate::error::AppError;
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreWritePrecondition};
use serde::{Deserialize, Serialize};

const MAX_SEQUENCE_ATTEMPTS: u32 = 5;

/// Counter document backing store-assigned ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Sequence {
    value: u64,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. All database operations return an error.
    pub fn new_offline() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Client whose reads join `transaction`, so Firestore aborts the
    /// commit if a document read here changed underneath it.
    fn transactional(
        client: &firestore::FirestoreDb,
        transaction: &firestore::FirestoreTransaction<'_>,
    ) -> firestore::FirestoreDb {
        client.clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
            transaction.transaction_id().clone(),
        ))
    }

    // ─── Generic Record Operations ───────────────────────────────

    pub async fn find_by_id<T: Record>(&self, id: u64) -> Result<Option<T>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(T::COLLECTION)
            .obj()
            .one(&id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn find_where<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>, AppError> {
        let filters = filters.to_vec();

        self.get_client()?
            .fluent()
            .select()
            .from(T::COLLECTION)
            .filter(move |q| {
                let conditions: Vec<_> = filters
                    .iter()
                    .map(|f| match &f.value {
                        FieldValue::Id(v) => q.field(f.field).eq(*v),
                        FieldValue::Text(v) => q.field(f.field).eq(v.clone()),
                        FieldValue::Flag(v) => q.field(f.field).eq(*v),
                    })
                    .collect();
                q.for_all(conditions)
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create-only write. Returns `Ok(false)` if the document already exists.
    pub async fn insert<T: Record>(&self, record: &T) -> Result<bool, AppError> {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(T::COLLECTION)
            .document_id(record.id().to_string())
            .object(record)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Update-only write. Returns `Ok(false)` if the document is gone.
    pub async fn update<T: Record>(&self, record: &T) -> Result<bool, AppError> {
        let result: Result<(), FirestoreError> = self
            .get_client()?
            .fluent()
            .update()
            .in_col(T::COLLECTION)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(record.id().to_string())
            .object(record)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(FirestoreError::DataNotFoundError(_)) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Compare-and-swap write inside a transaction.
    ///
    /// Returns `Ok(false)` when the document is missing, the stored version
    /// differs, or a concurrent writer made Firestore abort the commit.
    pub async fn save_versioned<T: Versioned>(
        &self,
        record: &T,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let doc_id = record.id().to_string();

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let current: Option<T> = Self::transactional(client, &transaction)
            .fluent()
            .select()
            .by_id_in(T::COLLECTION)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read {} in transaction: {}", T::KIND, e))
            })?;

        let matches = current.is_some_and(|c| c.version() == expected_version);
        if !matches {
            let _ = transaction.rollback().await;
            return Ok(false);
        }

        client
            .fluent()
            .update()
            .in_col(T::COLLECTION)
            .document_id(&doc_id)
            .object(record)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add {} to transaction: {}", T::KIND, e))
            })?;

        match transaction.commit().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!(
                    entity = %T::KIND,
                    id = record.id(),
                    error = %e,
                    "Versioned commit rejected"
                );
                Ok(false)
            }
        }
    }

    pub async fn delete_by_id<T: Record>(&self, id: u64) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(T::COLLECTION)
            .document_id(id.to_string())
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment and return the counter document for `collection`.
    ///
    /// The counter is read inside the transaction; a commit that loses to a
    /// concurrent allocation is retried with a fresh read.
    pub async fn next_sequence(&self, collection: &'static str) -> Result<u64, AppError> {
        let client = self.get_client()?;

        for attempt in 1..=MAX_SEQUENCE_ATTEMPTS {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            let current: Option<Sequence> = Self::transactional(client, &transaction)
                .fluent()
                .select()
                .by_id_in(collections::SEQUENCES)
                .obj()
                .one(collection)
                .await
                .map_err(|e| AppError::Database(format!("Failed to read sequence: {}", e)))?;

            let next = Sequence {
                value: current.unwrap_or_default().value + 1,
            };

            client
                .fluent()
                .update()
                .in_col(collections::SEQUENCES)
                .document_id(collection)
                .object(&next)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add sequence to transaction: {}", e))
                })?;

            match transaction.commit().await {
                Ok(_) => {
                    tracing::debug!(collection, value = next.value, "Allocated sequence id");
                    return Ok(next.value);
                }
                Err(e) => {
                    tracing::warn!(collection, attempt, error = %e, "Sequence commit contended");
                }
            }
        }

        Err(AppError::Database(format!(
            "Could not allocate a {} id after {} attempts",
            collection, MAX_SEQUENCE_ATTEMPTS
        )))
    }
}
