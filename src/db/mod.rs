//! Record store layer (Firestore or in-memory).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Activity, EntityKind, Goal, Task, User};
use serde::{de::DeserializeOwned, Serialize};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const GOALS: &str = "goals";
    pub const TASKS: &str = "tasks";
    pub const ACTIVITIES: &str = "activities";
    /// Per-collection id counters (keyed by collection name)
    pub const SEQUENCES: &str = "sequences";
}

/// An entity stored by id in its own collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;
    const KIND: EntityKind;

    fn id(&self) -> u64;
}

/// A record carrying an optimistic-concurrency version.
pub trait Versioned: Record {
    fn version(&self) -> u64;
}

impl Record for User {
    const COLLECTION: &'static str = collections::USERS;
    const KIND: EntityKind = EntityKind::User;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Goal {
    const COLLECTION: &'static str = collections::GOALS;
    const KIND: EntityKind = EntityKind::Goal;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Task {
    const COLLECTION: &'static str = collections::TASKS;
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for Activity {
    const COLLECTION: &'static str = collections::ACTIVITIES;
    const KIND: EntityKind = EntityKind::Activity;

    fn id(&self) -> u64 {
        self.id
    }
}

impl Versioned for Activity {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Value side of an equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Id(u64),
    Text(String),
    Flag(bool),
}

impl FieldValue {
    fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Id(v) => serde_json::Value::from(*v),
            FieldValue::Text(v) => serde_json::Value::from(v.as_str()),
            FieldValue::Flag(v) => serde_json::Value::from(*v),
        }
    }
}

/// `field == value`. A query is the conjunction of its filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: &'static str,
    pub value: FieldValue,
}

impl Filter {
    pub fn id(field: &'static str, value: u64) -> Self {
        Self {
            field,
            value: FieldValue::Id(value),
        }
    }

    pub fn text(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn flag(field: &'static str, value: bool) -> Self {
        Self {
            field,
            value: FieldValue::Flag(value),
        }
    }

    fn matches(&self, doc: &serde_json::Value) -> bool {
        doc.get(self.field) == Some(&self.value.to_json())
    }
}

/// Durable storage keyed by id.
///
/// Each mutating call is atomic for the single record it touches.
#[derive(Clone)]
pub enum RecordStore {
    Firestore(FirestoreDb),
    Memory(MemoryStore),
}

impl RecordStore {
    pub fn memory() -> Self {
        RecordStore::Memory(MemoryStore::new())
    }

    pub async fn find_by_id<T: Record>(&self, id: u64) -> Result<Option<T>, AppError> {
        match self {
            RecordStore::Firestore(db) => db.find_by_id(id).await,
            RecordStore::Memory(mem) => mem.find_by_id(id),
        }
    }

    /// All records matching every filter, ordered by id.
    pub async fn find_where<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>, AppError> {
        let mut records: Vec<T> = match self {
            RecordStore::Firestore(db) => db.find_where(filters).await?,
            RecordStore::Memory(mem) => mem.find_where(filters)?,
        };
        records.sort_by_key(|r| r.id());
        Ok(records)
    }

    /// Create-only write. Returns `false` (and writes nothing) if a record
    /// with the same id already exists.
    pub async fn insert<T: Record>(&self, record: &T) -> Result<bool, AppError> {
        match self {
            RecordStore::Firestore(db) => db.insert(record).await,
            RecordStore::Memory(mem) => mem.insert(record),
        }
    }

    /// Like [`insert`](Self::insert), but a taken id is `AlreadyExists`.
    pub async fn create<T: Record>(&self, record: &T) -> Result<T, AppError> {
        if !self.insert(record).await? {
            return Err(AppError::AlreadyExists {
                field: "id",
                value: record.id().to_string(),
            });
        }
        Ok(record.clone())
    }

    /// Overwrite an existing record. A record deleted since it was read is
    /// `NotFound` and stays deleted.
    pub async fn update<T: Record>(&self, record: &T) -> Result<T, AppError> {
        let written = match self {
            RecordStore::Firestore(db) => db.update(record).await?,
            RecordStore::Memory(mem) => mem.update(record)?,
        };
        if !written {
            return Err(AppError::not_found(T::KIND, record.id()));
        }
        Ok(record.clone())
    }

    /// Write `record` only if the stored copy is still at `expected_version`.
    ///
    /// Returns `false` (and writes nothing) when the record is missing or
    /// another writer got there first.
    pub async fn save_versioned<T: Versioned>(
        &self,
        record: &T,
        expected_version: u64,
    ) -> Result<bool, AppError> {
        match self {
            RecordStore::Firestore(db) => db.save_versioned(record, expected_version).await,
            RecordStore::Memory(mem) => mem.save_versioned(record, expected_version),
        }
    }

    pub async fn delete_by_id<T: Record>(&self, id: u64) -> Result<(), AppError> {
        match self {
            RecordStore::Firestore(db) => db.delete_by_id::<T>(id).await,
            RecordStore::Memory(mem) => mem.delete_by_id::<T>(id),
        }
    }

    pub async fn exists_by_id<T: Record>(&self, id: u64) -> Result<bool, AppError> {
        Ok(self.find_by_id::<T>(id).await?.is_some())
    }

    /// Next store-assigned id for a collection. Ids are never handed out twice.
    pub async fn next_sequence(&self, collection: &'static str) -> Result<u64, AppError> {
        match self {
            RecordStore::Firestore(db) => db.next_sequence(collection).await,
            RecordStore::Memory(mem) => Ok(mem.next_sequence(collection)),
        }
    }
}
