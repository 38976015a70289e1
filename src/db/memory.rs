// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process record store.
//!
//! Documents are kept as JSON so filters see exactly the field names the
//! Firestore backend stores. Used for local development and tests.

use crate::db::{Filter, Record, Versioned};
use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

type Key = (&'static str, u64);

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<DashMap<Key, serde_json::Value>>,
    sequences: Arc<DashMap<&'static str, u64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_by_id<T: Record>(&self, id: u64) -> Result<Option<T>, AppError> {
        self.documents
            .get(&(T::COLLECTION, id))
            .map(|doc| decode(doc.value()))
            .transpose()
    }

    pub fn find_where<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>, AppError> {
        self.documents
            .iter()
            .filter(|entry| entry.key().0 == T::COLLECTION)
            .filter(|entry| filters.iter().all(|f| f.matches(entry.value())))
            .map(|entry| decode(entry.value()))
            .collect()
    }

    /// Create-only write. Returns `false` if the id is taken.
    pub fn insert<T: Record>(&self, record: &T) -> Result<bool, AppError> {
        let doc = encode(record)?;
        match self.documents.entry((T::COLLECTION, record.id())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(doc);
                Ok(true)
            }
        }
    }

    /// Update-only write. Returns `false` if the record is gone.
    pub fn update<T: Record>(&self, record: &T) -> Result<bool, AppError> {
        let doc = encode(record)?;
        match self.documents.entry((T::COLLECTION, record.id())) {
            Entry::Occupied(mut entry) => {
                entry.insert(doc);
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    pub fn save_versioned<T: Versioned>(
        &self,
        record: &T,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        let doc = encode(record)?;

        // The entry guard holds the shard lock across the compare and the write.
        match self.documents.entry((T::COLLECTION, record.id())) {
            Entry::Occupied(mut entry) => {
                let current: T = decode(entry.get())?;
                if current.version() != expected_version {
                    return Ok(false);
                }
                entry.insert(doc);
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    pub fn delete_by_id<T: Record>(&self, id: u64) -> Result<(), AppError> {
        self.documents.remove(&(T::COLLECTION, id));
        Ok(())
    }

    pub fn next_sequence(&self, collection: &'static str) -> u64 {
        let mut counter = self.sequences.entry(collection).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Number of stored documents in a collection.
    pub fn count(&self, collection: &str) -> usize {
        self.documents
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .count()
    }
}

fn encode<T: Record>(record: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(record)
        .map_err(|e| AppError::Database(format!("Failed to encode {}: {}", T::KIND, e)))
}

fn decode<T: Record>(doc: &serde_json::Value) -> Result<T, AppError> {
    serde_json::from_value(doc.clone())
        .map_err(|e| AppError::Database(format!("Failed to decode {}: {}", T::KIND, e)))
}
