//! Error classification: every pipeline failure maps to exactly one
//! user-facing category with a fixed message.
//!
//! Each stage raises its own typed error, so classification is a total match
//! over closed enums. Diagnostic text stays in logs; users only ever see
//! [`ErrorCategory::user_message`].

use serde::Serialize;
use thiserror::Error;

use crate::interview::sanitizer::SanitizeError;
use crate::llm_client::LlmError;
use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    MissingFields,
    Configuration,
    Quota,
    Network,
    ParseError,
    PersistenceFailure,
    Unknown,
}

impl ErrorCategory {
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorCategory::MissingFields => "Please fill all required fields.",
            ErrorCategory::Configuration => {
                "The question generator is not configured. Please check the GEMINI_API_KEY setting and restart the server."
            }
            ErrorCategory::Quota => {
                "API quota exceeded. Please check your Gemini API usage limits and try again later."
            }
            ErrorCategory::Network => {
                "Network error. Please check your internet connection and try again."
            }
            ErrorCategory::ParseError => {
                "Failed to parse AI response. The API may have returned invalid data. Please try again."
            }
            ErrorCategory::PersistenceFailure => {
                "Failed to save the interview. Please try again."
            }
            ErrorCategory::Unknown => "Failed to generate questions. Please try again later.",
        }
    }

    /// Stable machine-readable code for API clients.
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::MissingFields => "MISSING_FIELDS",
            ErrorCategory::Configuration => "CONFIGURATION_ERROR",
            ErrorCategory::Quota => "QUOTA_EXCEEDED",
            ErrorCategory::Network => "NETWORK_ERROR",
            ErrorCategory::ParseError => "PARSE_ERROR",
            ErrorCategory::PersistenceFailure => "PERSISTENCE_ERROR",
            ErrorCategory::Unknown => "UNKNOWN_ERROR",
        }
    }
}

/// A failure from any pipeline stage, tagged by origin.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error(transparent)]
    Generation(#[from] LlmError),

    #[error(transparent)]
    Parse(#[from] SanitizeError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    pub fn category(&self) -> ErrorCategory {
        classify(self)
    }
}

pub fn classify(error: &PipelineError) -> ErrorCategory {
    match error {
        PipelineError::MissingFields(_) => ErrorCategory::MissingFields,
        PipelineError::Generation(LlmError::Configuration(_)) => ErrorCategory::Configuration,
        PipelineError::Generation(LlmError::Quota(_)) => ErrorCategory::Quota,
        PipelineError::Generation(LlmError::Network(_)) => ErrorCategory::Network,
        PipelineError::Generation(LlmError::Unknown(_)) => ErrorCategory::Unknown,
        PipelineError::Parse(_) => ErrorCategory::ParseError,
        PipelineError::Persistence(_) => ErrorCategory::PersistenceFailure,
    }
}
