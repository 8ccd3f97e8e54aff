use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One generated question/answer pair. Has no identity outside its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub answer: String,
}

/// Years of experience exactly as the client sent it.
///
/// The form field is free text on the client, so both `3` and `"3"` arrive in
/// practice. The value is persisted as provided; only validation interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Experience {
    Years(i64),
    Text(String),
}

impl Experience {
    /// Numeric reading of the value, if it has one.
    pub fn years(&self) -> Option<i64> {
        match self {
            Experience::Years(n) => Some(*n),
            Experience::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Experience::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Experience::Years(n) => write!(f, "{n}"),
            Experience::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// The persisted interview document.
///
/// `id` never changes once assigned and the record stays with one `user_id`
/// for its lifetime. `created_at` is set once; `updated_at` on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub position: String,
    pub experience: Option<Experience>,
    pub description: String,
    pub tech_stack: String,
    pub questions: Vec<GeneratedQuestion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
