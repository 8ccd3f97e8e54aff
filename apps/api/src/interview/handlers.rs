//! Axum route handlers for the Interview API.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::errors::AppError;
use crate::interview::form::FormInput;
use crate::interview::pipeline::{Notification, SaveOutcome, SaveRequest};
use crate::interview::session::PipelineState;
use crate::models::interview::InterviewRecord;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub id: String,
    pub navigate_to: String,
    pub notification: Notification,
    pub interview: InterviewRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusQuery {
    pub interview_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub busy: bool,
    #[serde(flatten)]
    pub state: PipelineState,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Create mode: generates questions for the form and stores them under a
/// freshly minted id.
pub async fn handle_create_interview(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveResponse>), AppError> {
    let Json(form) = payload?;
    let response = run_save(&state, owner_id, None, form).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// PUT /api/v1/interviews/:id
///
/// Edit mode: regenerates questions and merges them into the existing record.
pub async fn handle_update_interview(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    Path(interview_id): Path<String>,
    payload: Result<Json<FormInput>, JsonRejection>,
) -> Result<Json<SaveResponse>, AppError> {
    let Json(form) = payload?;

    // Refuse before spending a generation call on someone else's record
    if let Some(existing) = state.store.get(&interview_id).await? {
        if existing.user_id != owner_id {
            return Err(AppError::Forbidden);
        }
    }

    let response = run_save(&state, owner_id, Some(interview_id), form).await?;
    Ok(Json(response))
}

/// GET /api/v1/interviews/:id
///
/// Returns the stored record, e.g. to prefill the edit form.
pub async fn handle_get_interview(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    Path(interview_id): Path<String>,
) -> Result<Json<InterviewRecord>, AppError> {
    let record = state
        .store
        .get(&interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    if record.user_id != owner_id {
        return Err(AppError::Forbidden);
    }

    Ok(Json(record))
}

/// GET /api/v1/interviews
pub async fn handle_list_interviews(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
) -> Result<Json<Vec<InterviewRecord>>, AppError> {
    Ok(Json(state.store.list_for_owner(&owner_id).await?))
}

/// GET /api/v1/sessions/status?interviewId=
///
/// Current pipeline state for the caller's editing session. Clients poll this
/// to keep form inputs disabled while `busy` is true.
pub async fn handle_session_status(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    Query(query): Query<SessionStatusQuery>,
) -> Json<SessionStatusResponse> {
    let pipeline_state = state
        .sessions
        .find(&owner_id, query.interview_id.as_deref())
        .map(|session| session.state())
        .unwrap_or(PipelineState::Idle);

    Json(SessionStatusResponse {
        busy: pipeline_state.is_busy(),
        state: pipeline_state,
    })
}

async fn run_save(
    state: &AppState,
    owner_id: String,
    interview_id: Option<String>,
    form: FormInput,
) -> Result<SaveResponse, AppError> {
    let session = state.sessions.session(&owner_id, interview_id.as_deref());
    let pipeline = state.pipeline.clone();
    let request = SaveRequest {
        owner_id,
        interview_id,
        form,
    };

    // Detached so a dropped connection cannot abandon the session mid-flight.
    let outcome = tokio::spawn(async move { pipeline.save(&session, request).await })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("save task failed: {e}")))?;

    match outcome {
        SaveOutcome::Succeeded {
            record,
            navigate_to,
            notification,
            ..
        } => Ok(SaveResponse {
            id: record.id.clone(),
            navigate_to,
            notification,
            interview: record,
        }),
        SaveOutcome::Failed { category, .. } => Err(AppError::Pipeline(category)),
        SaveOutcome::Rejected => Err(AppError::Busy),
    }
}
