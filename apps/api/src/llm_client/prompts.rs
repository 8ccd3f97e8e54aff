// Shared prompt fragments.
// Each feature that calls the generation service defines its own prompts.rs
// alongside it. This file holds the cross-cutting output-format directive.

/// Appended to every prompt whose answer is parsed as a JSON array.
pub const JSON_ARRAY_ONLY_INSTRUCTION: &str = "Please format the output strictly as an array \
    of JSON objects without any additional labels, code blocks, or explanations. \
    Return only the JSON array.";
