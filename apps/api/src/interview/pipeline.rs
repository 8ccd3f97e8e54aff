//! Interview pipeline: orchestrates one save attempt.
//!
//! Flow: validate_form → build_question_prompt → llm.send → sanitize_response
//!       → check_question_set → upsert_interview → navigation target.
//!
//! Any stage failure skips the rest and is classified into a single
//! category. Nothing is retried here; a retry is a new save from the user.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::interview::classify::{ErrorCategory, PipelineError};
use crate::interview::form::{validate_form, FormInput};
use crate::interview::prompts::build_question_prompt;
use crate::interview::sanitizer::{check_question_set, sanitize_response};
use crate::interview::session::{EditingSession, PipelineState};
use crate::interview::upsert::{upsert_interview, SaveMode, UpsertParams, Upserted};
use crate::llm_client::GenerationClient;
use crate::models::interview::InterviewRecord;
use crate::store::RecordStore;

/// Path the client navigates to after a successful save.
pub fn navigation_target(interview_id: &str) -> String {
    format!("/generate/{interview_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// The single user-facing message produced by a save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: &'static str,
    pub description: &'static str,
}

impl Notification {
    fn saved(mode: SaveMode) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: "Success",
            description: match mode {
                SaveMode::Create => "Interview created successfully!",
                SaveMode::Edit => "Interview updated successfully!",
            },
        }
    }

    fn failed(category: ErrorCategory) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: "Error",
            description: category.user_message(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub owner_id: String,
    /// Present in edit mode.
    pub interview_id: Option<String>,
    pub form: FormInput,
}

#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Succeeded {
        record: InterviewRecord,
        mode: SaveMode,
        navigate_to: String,
        notification: Notification,
    },
    Failed {
        category: ErrorCategory,
        notification: Notification,
    },
    /// Another save was already in flight for this session.
    Rejected,
}

pub struct InterviewPipeline {
    llm: Arc<dyn GenerationClient>,
    store: Arc<dyn RecordStore>,
}

impl InterviewPipeline {
    pub fn new(llm: Arc<dyn GenerationClient>, store: Arc<dyn RecordStore>) -> Self {
        Self { llm, store }
    }

    /// Runs one save attempt against `session`.
    ///
    /// Returns `Rejected` without touching the session if a save is already
    /// running. Otherwise the session ends in `Succeeded` or `Failed`.
    pub async fn save(&self, session: &EditingSession, request: SaveRequest) -> SaveOutcome {
        if !session.try_begin() {
            warn!(
                "Save rejected for user {}: another save is in flight",
                request.owner_id
            );
            return SaveOutcome::Rejected;
        }

        match self.run(session, &request).await {
            Ok(Upserted { mode, record }) => {
                let navigate_to = navigation_target(&record.id);
                session.transition(PipelineState::Succeeded {
                    interview_id: record.id.clone(),
                });
                info!("Save succeeded for interview {}, navigating to {}", record.id, navigate_to);
                SaveOutcome::Succeeded {
                    record,
                    mode,
                    navigate_to,
                    notification: Notification::saved(mode),
                }
            }
            Err(e) => {
                let category = e.category();
                match category {
                    ErrorCategory::MissingFields
                    | ErrorCategory::Quota
                    | ErrorCategory::Network
                    | ErrorCategory::ParseError => {
                        warn!("Save failed ({:?}) for user {}: {}", category, request.owner_id, e)
                    }
                    ErrorCategory::Configuration
                    | ErrorCategory::PersistenceFailure
                    | ErrorCategory::Unknown => {
                        error!("Save failed ({:?}) for user {}: {}", category, request.owner_id, e)
                    }
                }
                session.transition(PipelineState::Failed { category });
                SaveOutcome::Failed {
                    category,
                    notification: Notification::failed(category),
                }
            }
        }
    }

    async fn run(
        &self,
        session: &EditingSession,
        request: &SaveRequest,
    ) -> Result<Upserted, PipelineError> {
        validate_form(&request.form).map_err(PipelineError::MissingFields)?;

        session.transition(PipelineState::Generating);
        let prompt = build_question_prompt(&request.form);
        let raw = self.llm.send(prompt.as_str()).await?;
        let questions = sanitize_response(&raw)?;
        check_question_set(&questions)?;
        info!("Generated {} questions for user {}", questions.len(), request.owner_id);

        session.transition(PipelineState::Saving);
        let upserted = upsert_interview(
            self.store.as_ref(),
            UpsertParams {
                owner_id: &request.owner_id,
                existing_id: request.interview_id.as_deref(),
                form: &request.form,
                questions,
            },
        )
        .await?;

        Ok(upserted)
    }
}
