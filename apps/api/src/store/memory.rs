use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use crate::models::interview::InterviewRecord;
use crate::store::{CreatedAt, RecordPatch, RecordStore, StoreError};

/// In-process store with the same merge and timestamp rules as Postgres.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<String, InterviewRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, id: &str) -> Result<Option<InterviewRecord>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn upsert(&self, id: &str, patch: RecordPatch) -> Result<InterviewRecord, StoreError> {
        let mut records = self.records.write().await;
        let now = Utc::now();

        let record = match records.get_mut(id) {
            Some(existing) => {
                if patch.user_id.as_deref().is_some_and(|owner| owner != existing.user_id) {
                    return Err(StoreError::OwnerMismatch { id: id.to_string() });
                }
                merge_into(existing, patch);
                // updated_at only moves forward, even on a coarse clock
                existing.updated_at = now.max(existing.updated_at + Duration::microseconds(1));
                existing.clone()
            }
            None => {
                let created_at = match patch.created_at {
                    CreatedAt::ServerTimestamp => now,
                    CreatedAt::Preserve(ts) => ts,
                };
                let record = InterviewRecord {
                    id: id.to_string(),
                    user_id: patch.user_id.unwrap_or_default(),
                    name: patch.name.unwrap_or_default(),
                    position: patch.position.unwrap_or_default(),
                    experience: patch.experience,
                    description: patch.description.unwrap_or_default(),
                    tech_stack: patch.tech_stack.unwrap_or_default(),
                    questions: patch.questions.unwrap_or_default(),
                    created_at,
                    updated_at: now,
                };
                records.insert(id.to_string(), record.clone());
                record
            }
        };

        Ok(record)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<InterviewRecord>, StoreError> {
        let mut owned: Vec<InterviewRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.user_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }
}

/// Owner is fixed at insert and never merged.
fn merge_into(record: &mut InterviewRecord, patch: RecordPatch) {
    if let Some(name) = patch.name {
        record.name = name;
    }
    if let Some(position) = patch.position {
        record.position = position;
    }
    if let Some(experience) = patch.experience {
        record.experience = Some(experience);
    }
    if let Some(description) = patch.description {
        record.description = description;
    }
    if let Some(tech_stack) = patch.tech_stack {
        record.tech_stack = tech_stack;
    }
    if let Some(questions) = patch.questions {
        record.questions = questions;
    }
}
