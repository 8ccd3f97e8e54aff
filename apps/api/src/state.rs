use std::sync::Arc;

use crate::interview::pipeline::InterviewPipeline;
use crate::interview::session::SessionRegistry;
use crate::store::RecordStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Interview document store. Postgres when DATABASE_URL is set, in-memory otherwise.
    pub store: Arc<dyn RecordStore>,
    pub pipeline: Arc<InterviewPipeline>,
    /// One editing session per (user, interview); serializes saves.
    pub sessions: Arc<SessionRegistry>,
}
