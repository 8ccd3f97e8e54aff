//! Record upsert: picks the record id, merges generated questions with the
//! form, and commits through the document store.

use tracing::info;
use uuid::Uuid;

use crate::interview::form::FormInput;
use crate::models::interview::{GeneratedQuestion, InterviewRecord};
use crate::store::{CreatedAt, RecordPatch, RecordStore, StoreError};

/// Whether the save targeted an existing id or minted a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Create,
    Edit,
}

/// Parameters for committing one generated question set.
pub struct UpsertParams<'a> {
    pub owner_id: &'a str,
    /// `Some` in edit mode; the id is reused as-is.
    pub existing_id: Option<&'a str>,
    pub form: &'a FormInput,
    pub questions: Vec<GeneratedQuestion>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone)]
pub struct Upserted {
    pub mode: SaveMode,
    pub record: InterviewRecord,
}

/// Mints a new record id.
pub fn mint_record_id() -> String {
    Uuid::new_v4().to_string()
}

/// Commits the interview record. Returns the stored record and the mode used.
///
/// The prior record is read before writing so its `created_at` is carried
/// forward explicitly. A record that belongs to another user is never
/// overwritten.
pub async fn upsert_interview(
    store: &dyn RecordStore,
    params: UpsertParams<'_>,
) -> Result<Upserted, StoreError> {
    let UpsertParams {
        owner_id,
        existing_id,
        form,
        questions,
    } = params;

    let (mode, id) = match existing_id {
        Some(id) => (SaveMode::Edit, id.to_string()),
        None => (SaveMode::Create, mint_record_id()),
    };

    let created_at = match store.get(&id).await? {
        Some(prior) if prior.user_id != owner_id => {
            return Err(StoreError::OwnerMismatch { id });
        }
        Some(prior) => CreatedAt::Preserve(prior.created_at),
        None => CreatedAt::ServerTimestamp,
    };

    let patch = RecordPatch {
        user_id: Some(owner_id.to_string()),
        name: Some(form.name.trim().to_string()),
        position: Some(form.position.trim().to_string()),
        experience: form.experience.clone(),
        description: form.description.clone(),
        tech_stack: form.tech_stack.clone(),
        questions: Some(questions),
        created_at,
    };

    let record = store.upsert(&id, patch).await?;

    info!(
        "Committed interview {} ({:?}) with {} questions for user {}",
        record.id,
        mode,
        record.questions.len(),
        owner_id
    );

    Ok(Upserted { mode, record })
}
