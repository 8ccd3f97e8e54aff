//! Form input and the pre-flight required-field check.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::interview::Experience;

/// What the user typed into the create/edit form.
///
/// Lives only for one save attempt. `description` and `tech_stack` are optional;
/// the other three are required and checked by [`validate_form`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub position: String,
    #[serde(
        default,
        alias = "experienceYears",
        deserialize_with = "lenient_experience"
    )]
    pub experience: Option<Experience>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<String>,
}

impl FormInput {
    /// Description with surrounding whitespace removed, or "" when absent.
    pub fn description_text(&self) -> &str {
        self.description.as_deref().map(str::trim).unwrap_or("")
    }

    /// Tech stack with surrounding whitespace removed, or "" when absent.
    pub fn tech_stack_text(&self) -> &str {
        self.tech_stack.as_deref().map(str::trim).unwrap_or("")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts any JSON value so that an unusable experience (a fraction, a
/// boolean) reaches [`validate_form`] instead of failing the request body.
/// Such values are kept as their JSON text, which never reads as whole years.
fn lenient_experience<'de, D>(deserializer: D) -> Result<Option<Experience>, D::Error>
where
    D: Deserializer<'de>,
{
    let experience = Option::<Value>::deserialize(deserializer)?.and_then(|value| match value {
        Value::Null => None,
        Value::String(text) => Some(Experience::Text(text)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(years) => Experience::Years(years),
            None => Experience::Text(n.to_string()),
        }),
        other => Some(Experience::Text(other.to_string())),
    });
    Ok(experience)
}

/// Returns the names of required fields that are missing or unusable.
///
/// Pure: no I/O, no logging. Experience counts as missing when it is blank,
/// negative, or text that does not read as a whole number.
pub fn validate_form(form: &FormInput) -> Result<(), Vec<&'static str>> {
    let mut missing = Vec::new();

    if form.name.trim().is_empty() {
        missing.push("name");
    }
    if form.position.trim().is_empty() {
        missing.push("position");
    }

    let experience_ok = match &form.experience {
        None => false,
        Some(exp) if exp.is_blank() => false,
        Some(exp) => exp.years().is_some_and(|years| years >= 0),
    };
    if !experience_ok {
        missing.push("experience");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}
