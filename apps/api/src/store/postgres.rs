use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};

use crate::models::interview::{Experience, GeneratedQuestion, InterviewRecord};
use crate::store::{CreatedAt, RecordPatch, RecordStore, StoreError};

/// Row shape of the `interviews` table.
#[derive(Debug, FromRow)]
struct InterviewRow {
    id: String,
    user_id: String,
    name: String,
    position: String,
    experience: Value,
    description: String,
    tech_stack: String,
    questions: Json<Vec<GeneratedQuestion>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for InterviewRecord {
    type Error = StoreError;

    fn try_from(row: InterviewRow) -> Result<Self, Self::Error> {
        let experience: Option<Experience> =
            serde_json::from_value(row.experience).map_err(|e| StoreError::Corrupt {
                id: row.id.clone(),
                reason: format!("experience: {e}"),
            })?;

        Ok(InterviewRecord {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            position: row.position,
            experience,
            description: row.description,
            tech_stack: row.tech_stack,
            questions: row.questions.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Postgres-backed store over the `interviews` table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn get(&self, id: &str) -> Result<Option<InterviewRecord>, StoreError> {
        let row = sqlx::query_as::<_, InterviewRow>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(InterviewRecord::try_from).transpose()
    }

    async fn upsert(&self, id: &str, patch: RecordPatch) -> Result<InterviewRecord, StoreError> {
        let preserved_created_at = match patch.created_at {
            CreatedAt::ServerTimestamp => None,
            CreatedAt::Preserve(ts) => Some(ts),
        };
        let experience = patch.experience.map(Json);
        let questions = patch.questions.map(Json);

        // created_at and user_id are absent from the UPDATE arm, and the WHERE
        // clause skips the update for another owner so no row comes back.
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            INSERT INTO interviews
                (id, user_id, name, position, experience, description, tech_stack,
                 questions, created_at, updated_at)
            VALUES ($1, COALESCE($2, ''), COALESCE($3, ''), COALESCE($4, ''),
                    COALESCE($5, 'null'::jsonb), COALESCE($6, ''), COALESCE($7, ''),
                    COALESCE($8, '[]'::jsonb), COALESCE($9, now()), now())
            ON CONFLICT (id) DO UPDATE SET
                name        = COALESCE($3, interviews.name),
                position    = COALESCE($4, interviews.position),
                experience  = COALESCE($5, interviews.experience),
                description = COALESCE($6, interviews.description),
                tech_stack  = COALESCE($7, interviews.tech_stack),
                questions   = COALESCE($8, interviews.questions),
                updated_at  = GREATEST(now(), interviews.updated_at + interval '1 microsecond')
            WHERE interviews.user_id = COALESCE($2, interviews.user_id)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.user_id)
        .bind(patch.name)
        .bind(patch.position)
        .bind(experience)
        .bind(patch.description)
        .bind(patch.tech_stack)
        .bind(questions)
        .bind(preserved_created_at)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::OwnerMismatch { id: id.to_string() })?;

        InterviewRecord::try_from(row)
    }

    async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<InterviewRecord>, StoreError> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            "SELECT * FROM interviews WHERE user_id = $1 ORDER BY updated_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(InterviewRecord::try_from).collect()
    }
}
