/// LLM Client: the single point of entry for all generative-text calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generation goes through `GenerationClient`.
///
/// This layer is a text transport only. It never interprets the returned text;
/// extraction of the question payload lives in `interview::sanitizer`.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Carries the credential so it never appears in a request URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

const TEMPERATURE: f32 = 1.0;
const TOP_P: f32 = 0.95;
const TOP_K: u32 = 40;
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Service-level failures, one variant per category the caller must tell apart.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generation service is not configured: {0}")]
    Configuration(String),

    #[error("generation quota exceeded: {0}")]
    Quota(String),

    #[error("network error talking to generation service: {0}")]
    Network(#[source] reqwest::Error),

    #[error("generation service failed: {0}")]
    Unknown(String),
}

/// Sends a prompt and returns the raw response text.
///
/// Carried in `AppState` as `Arc<dyn GenerationClient>` so tests can swap in a
/// fake without touching the pipeline.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        Some(text)
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    reason: Option<String>,
}

/// Gemini `generateContent` backend.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    /// Makes a single call to Gemini. Never retries; the caller surfaces the
    /// classified failure and the user decides whether to try again.
    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::Configuration("GEMINI_API_KEY is not set".to_string())
        })?;

        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                response_mime_type: "text/plain",
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API returned {}: {}", status, body);
            return Err(classify_api_error(status, &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Unknown(format!("undecodable response body: {}", e.without_url())))?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={}, output_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        match body.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(LlmError::Unknown("empty response from Gemini".to_string())),
            None => Err(LlmError::Unknown("invalid response from Gemini".to_string())),
        }
    }
}

fn classify_transport_error(e: reqwest::Error) -> LlmError {
    let e = e.without_url();
    if e.is_connect() || e.is_timeout() || e.is_request() {
        LlmError::Network(e)
    } else {
        LlmError::Unknown(e.to_string())
    }
}

/// Maps a non-success Gemini response onto the failure taxonomy.
fn classify_api_error(status: StatusCode, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<GeminiError>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());

    let api_status = parsed.as_ref().map(|e| e.error.status.as_str()).unwrap_or("");
    let key_rejected = parsed.as_ref().is_some_and(|e| {
        e.error
            .details
            .iter()
            .any(|d| d.reason.as_deref() == Some("API_KEY_INVALID"))
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || key_rejected {
        LlmError::Configuration(message)
    } else if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        LlmError::Quota(message)
    } else {
        LlmError::Unknown(format!("status {}: {}", status.as_u16(), message))
    }
}
