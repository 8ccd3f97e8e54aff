// Prompt template for interview question generation.
// Reuses the cross-cutting output directive from llm_client::prompts.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::interview::form::FormInput;
use crate::llm_client::prompts::JSON_ARRAY_ONLY_INSTRUCTION;

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

/// Number of question/answer pairs requested from the model.
pub const QUESTION_COUNT: usize = 5;

/// Used when neither a tech stack nor a description was given.
const GENERAL_TECH_SIGNAL: &str = "general";

/// Question generation template.
/// Replace: {count}, {position}, {description}, {experience}, {tech_stack}, {format_instruction}
pub const QUESTION_PROMPT_TEMPLATE: &str = r#"As an experienced interview question author, generate a JSON array containing {count} technical interview questions along with detailed answers based on the following job information. Return exactly {count} objects, each with the keys "question" and "answer", formatted as follows:

[
  { "question": "<Question text>", "answer": "<Answer text>" },
  ...
]

Job Information:
- Job Position: {position}
- Job Description: {description}
- Years of Experience Required: {experience}
- Tech Stacks: {tech_stack}

The questions should assess skills in {tech_stack} development and best practices, problem-solving, and experience handling complex requirements. {format_instruction}"#;

/// A rendered prompt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renders the question prompt for a form.
///
/// Deterministic: the output depends only on position, description,
/// experience and tech stack. The tech-stack signal falls back to the
/// description, then to "general".
pub fn build_question_prompt(form: &FormInput) -> GenerationPrompt {
    let description = form.description_text();
    let tech_stack = match form.tech_stack_text() {
        "" if description.is_empty() => GENERAL_TECH_SIGNAL,
        "" => description,
        stack => stack,
    };
    let experience = form
        .experience
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();

    let count = QUESTION_COUNT.to_string();

    // One pass over the template, so braces inside user text stay literal.
    let rendered = PLACEHOLDER_RE.replace_all(QUESTION_PROMPT_TEMPLATE, |caps: &Captures| {
        match &caps[1] {
            "format_instruction" => JSON_ARRAY_ONLY_INSTRUCTION,
            "count" => count.as_str(),
            "position" => form.position.trim(),
            "description" => description,
            "experience" => experience.as_str(),
            "tech_stack" => tech_stack,
            _ => caps.get(0).map_or("", |m| m.as_str()),
        }
        .to_string()
    });

    GenerationPrompt(rendered.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::interview::Experience;

    fn jane() -> FormInput {
        FormInput {
            name: "Jane".to_string(),
            position: "Backend Engineer".to_string(),
            experience: Some(Experience::Years(3)),
            description: None,
            tech_stack: Some("Go".to_string()),
        }
    }

    #[test]
    fn test_prompt_contains_job_fields_and_format_directive() {
        let prompt = build_question_prompt(&jane());
        let text = prompt.as_str();
        assert!(text.contains("Backend Engineer"));
        assert!(text.contains("Go"));
        assert!(text.contains(r#"Return exactly 5 objects, each with the keys "question" and "answer""#));
        assert!(text.contains("Years of Experience Required: 3"));
        assert!(text.contains("without any additional labels, code blocks, or explanations"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let first = build_question_prompt(&jane());
        for _ in 0..10 {
            assert_eq!(build_question_prompt(&jane()), first);
        }
    }

    #[test]
    fn test_prompt_ignores_name() {
        let other = FormInput {
            name: "Someone Else".to_string(),
            ..jane()
        };
        assert_eq!(build_question_prompt(&other), build_question_prompt(&jane()));
    }

    #[test]
    fn test_tech_stack_falls_back_to_description() {
        let form = FormInput {
            tech_stack: Some("   ".to_string()),
            description: Some("Rust services on Kubernetes".to_string()),
            ..jane()
        };
        let prompt = build_question_prompt(&form);
        assert!(prompt
            .as_str()
            .contains("- Tech Stacks: Rust services on Kubernetes"));
        assert!(prompt
            .as_str()
            .contains("assess skills in Rust services on Kubernetes development"));
    }

    #[test]
    fn test_tech_stack_falls_back_to_general() {
        let form = FormInput {
            tech_stack: None,
            description: None,
            ..jane()
        };
        let prompt = build_question_prompt(&form);
        assert!(prompt.as_str().contains("- Tech Stacks: general"));
        assert!(prompt.as_str().contains("assess skills in general development"));
    }

    #[test]
    fn test_no_unfilled_placeholders() {
        let prompt = build_question_prompt(&jane());
        for placeholder in [
            "{count}",
            "{position}",
            "{description}",
            "{experience}",
            "{tech_stack}",
            "{format_instruction}",
        ] {
            assert!(!prompt.as_str().contains(placeholder), "{placeholder} left in prompt");
        }
    }

    #[test]
    fn test_placeholders_in_user_text_stay_literal() {
        let form = FormInput {
            position: "Engineer for {tech_stack}".to_string(),
            description: Some("Needs {experience} and {count}".to_string()),
            tech_stack: Some("Go".to_string()),
            ..jane()
        };
        let prompt = build_question_prompt(&form);
        let text = prompt.as_str();
        assert!(text.contains("- Job Position: Engineer for {tech_stack}"));
        assert!(text.contains("- Job Description: Needs {experience} and {count}"));
        assert!(text.contains("- Tech Stacks: Go"));
    }
}
