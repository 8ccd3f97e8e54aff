// Interview question generation and persistence.
// Implements: form validation, prompt building, response sanitizing,
// error classification, record upsert, and the per-session save pipeline.
// All generation calls go through llm_client.

pub mod classify;
pub mod form;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod sanitizer;
pub mod session;
pub mod upsert;
