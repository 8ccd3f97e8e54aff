//! Editing sessions: one pipeline state machine per (user, interview) pair.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::interview::classify::ErrorCategory;

/// Finished sessions nobody holds are dropped after this long.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(15 * 60);

/// Where a save attempt currently is.
///
/// Idle → Validating → Generating → Saving → Succeeded | Failed(category)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Validating,
    Generating,
    Saving,
    #[serde(rename_all = "camelCase")]
    Succeeded { interview_id: String },
    Failed { category: ErrorCategory },
}

impl PipelineState {
    /// True while a save is in flight; form inputs are disabled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Validating | PipelineState::Generating | PipelineState::Saving
        )
    }
}

#[derive(Debug)]
struct SessionInner {
    state: PipelineState,
    changed_at: Instant,
}

/// The state of one editing session. At most one save runs at a time.
#[derive(Debug)]
pub struct EditingSession {
    inner: Mutex<SessionInner>,
}

impl Default for EditingSession {
    fn default() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: PipelineState::Idle,
                changed_at: Instant::now(),
            }),
        }
    }
}

impl EditingSession {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> PipelineState {
        self.lock().state.clone()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().state.is_busy()
    }

    /// Claims the session for a new save. Returns false if one is in flight.
    pub fn try_begin(&self) -> bool {
        let mut inner = self.lock();
        if inner.state.is_busy() {
            return false;
        }
        inner.state = PipelineState::Validating;
        inner.changed_at = Instant::now();
        true
    }

    pub fn transition(&self, next: PipelineState) {
        let mut inner = self.lock();
        inner.state = next;
        inner.changed_at = Instant::now();
    }

    fn is_stale(&self, now: Instant) -> bool {
        let inner = self.lock();
        !inner.state.is_busy() && now.duration_since(inner.changed_at) >= SESSION_IDLE_TTL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SessionKey {
    owner_id: String,
    interview_id: Option<String>,
}

impl SessionKey {
    fn new(owner_id: &str, interview_id: Option<&str>) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            interview_id: interview_id.map(str::to_string),
        }
    }
}

/// Hands out the shared session for a (user, interview) pair. Create mode
/// (no interview id yet) gets one session per user.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionKey, Arc<EditingSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionKey, Arc<EditingSession>>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session for this pair, creating it if needed.
    pub fn session(&self, owner_id: &str, interview_id: Option<&str>) -> Arc<EditingSession> {
        let mut sessions = self.lock();
        let now = Instant::now();
        sessions.retain(|_, s| Arc::strong_count(s) > 1 || !s.is_stale(now));

        sessions
            .entry(SessionKey::new(owner_id, interview_id))
            .or_default()
            .clone()
    }

    /// Returns the session for this pair only if one exists.
    pub fn find(&self, owner_id: &str, interview_id: Option<&str>) -> Option<Arc<EditingSession>> {
        self.lock()
            .get(&SessionKey::new(owner_id, interview_id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_rejects_while_busy() {
        let session = EditingSession::new();
        assert!(!session.is_busy());
        assert!(session.try_begin());
        assert_eq!(session.state(), PipelineState::Validating);
        assert!(!session.try_begin());

        session.transition(PipelineState::Generating);
        assert!(!session.try_begin());
        session.transition(PipelineState::Saving);
        assert!(!session.try_begin());
    }

    #[test]
    fn test_begin_allowed_after_terminal_state() {
        let session = EditingSession::new();
        assert!(session.try_begin());
        session.transition(PipelineState::Failed {
            category: ErrorCategory::Network,
        });
        assert!(!session.is_busy());
        assert!(session.try_begin());
        session.transition(PipelineState::Succeeded {
            interview_id: "abc".to_string(),
        });
        assert!(session.try_begin());
    }

    #[test]
    fn test_registry_shares_session_per_key() {
        let registry = SessionRegistry::new();
        let a = registry.session("user_1", Some("abc"));
        let b = registry.session("user_1", Some("abc"));
        let other_user = registry.session("user_2", Some("abc"));
        let create = registry.session("user_1", None);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other_user));
        assert!(!Arc::ptr_eq(&a, &create));

        assert!(a.try_begin());
        assert!(b.is_busy());
        assert!(!other_user.is_busy());
    }

    #[test]
    fn test_find_does_not_create() {
        let registry = SessionRegistry::new();
        assert!(registry.find("user_1", None).is_none());
        let _held = registry.session("user_1", None);
        assert!(registry.find("user_1", None).is_some());
        assert!(registry.find("user_1", Some("abc")).is_none());
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let value = serde_json::to_value(PipelineState::Failed {
            category: ErrorCategory::ParseError,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"state": "failed", "category": "parse_error"})
        );

        let value = serde_json::to_value(PipelineState::Succeeded {
            interview_id: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"state": "succeeded", "interviewId": "abc"})
        );
    }
}
