//! Document store for interview records: get/upsert by id with store-side
//! timestamp stamping.
//!
//! `AppState` holds an `Arc<dyn RecordStore>`: Postgres in production, the
//! in-memory store when no database is configured and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::interview::{Experience, GeneratedQuestion, InterviewRecord};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("record {id} belongs to another user")]
    OwnerMismatch { id: String },

    #[error("stored record {id} is corrupt: {reason}")]
    Corrupt { id: String, reason: String },
}

/// How `created_at` is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedAt {
    /// Stamp with the store's clock when the record is first created.
    ServerTimestamp,
    /// Keep a value read before the write.
    Preserve(DateTime<Utc>),
}

/// Field-level merge payload. `None` leaves the stored value untouched.
///
/// `created_at` is never overwritten on an existing record, whichever
/// directive is passed; `updated_at` is always stamped by the store.
/// `user_id` is written on insert only. Upserting an existing record with a
/// different `user_id` fails with [`StoreError::OwnerMismatch`] and changes
/// nothing.
#[derive(Debug, Clone)]
pub struct RecordPatch {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub position: Option<String>,
    pub experience: Option<Experience>,
    pub description: Option<String>,
    pub tech_stack: Option<String>,
    pub questions: Option<Vec<GeneratedQuestion>>,
    pub created_at: CreatedAt,
}

impl RecordPatch {
    pub fn empty(created_at: CreatedAt) -> Self {
        Self {
            user_id: None,
            name: None,
            position: None,
            experience: None,
            description: None,
            tech_stack: None,
            questions: None,
            created_at,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<InterviewRecord>, StoreError>;

    /// Creates the record if absent, otherwise merges `patch` into it.
    /// Returns the record as stored after the write.
    async fn upsert(&self, id: &str, patch: RecordPatch) -> Result<InterviewRecord, StoreError>;

    /// All records owned by `owner_id`, most recently updated first.
    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<InterviewRecord>, StoreError>;
}
