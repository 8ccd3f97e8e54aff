//! Response sanitizer: pulls the question array out of free-form model output.
//!
//! Models often wrap the JSON in a fenced block or in a sentence or two of
//! prose. The extraction is deliberately simple:
//!
//! 1. trim the text
//! 2. drop every code fence marker and any `json` language tag
//! 3. take everything from the first `[` to the last `]`
//! 4. parse that span as a JSON array
//!
//! Known limitation: step 3 is greedy, so prose that itself contains square
//! brackets around the array will produce a span that fails to parse. That
//! surfaces as `MalformedJson` rather than being special-cased.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::models::interview::GeneratedQuestion;

/// Anything beyond this many entries is treated as a broken response.
pub const MAX_PLAUSIBLE_QUESTIONS: usize = 10;

/// A fence marker together with an optional `json` tag right after it.
static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```[ \t]*(?:json\b)?").unwrap());

/// A `json` tag left alone on its own line (fence already removed).
static BARE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)^[ \t]*json[ \t]*$").unwrap());

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("no array found in response")]
    NoArrayFound,

    #[error("malformed JSON in response: {0}")]
    MalformedJson(String),

    #[error("unexpected number of questions: {0}")]
    UnexpectedCount(usize),

    #[error("question {0} has neither a question nor an answer")]
    BlankEntry(usize),
}

/// Extracts the ordered question list from raw model output.
///
/// Entries missing `question` or `answer` come back with that field empty;
/// shape checks beyond "is a JSON array" belong to [`check_question_set`].
pub fn sanitize_response(raw: &str) -> Result<Vec<GeneratedQuestion>, SanitizeError> {
    let text = strip_fences(raw.trim());
    let candidate = array_span(&text).ok_or(SanitizeError::NoArrayFound)?;

    let entries: Vec<Value> = serde_json::from_str(candidate)
        .map_err(|e| SanitizeError::MalformedJson(e.to_string()))?;

    Ok(entries.iter().map(coerce_question).collect())
}

/// Rejects sets that almost certainly came from a misparse: empty, far more
/// entries than requested, or an entry with nothing in it.
pub fn check_question_set(questions: &[GeneratedQuestion]) -> Result<(), SanitizeError> {
    if questions.is_empty() || questions.len() > MAX_PLAUSIBLE_QUESTIONS {
        return Err(SanitizeError::UnexpectedCount(questions.len()));
    }
    if let Some(index) = questions
        .iter()
        .position(|q| q.question.trim().is_empty() && q.answer.trim().is_empty())
    {
        return Err(SanitizeError::BlankEntry(index));
    }
    Ok(())
}

fn strip_fences(text: &str) -> String {
    let without_fences = FENCE_RE.replace_all(text, "");
    BARE_TAG_RE.replace_all(&without_fences, "").into_owned()
}

/// First `[` through last `]`, spanning newlines.
fn array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}

fn coerce_question(entry: &Value) -> GeneratedQuestion {
    GeneratedQuestion {
        question: field_text(entry, "question"),
        answer: field_text(entry, "answer"),
    }
}

fn field_text(entry: &Value, key: &str) -> String {
    match entry.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
