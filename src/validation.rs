//! Parsing and normalization of untrusted lead submissions.
//!
//! Fields are checked in a fixed order and the first violation is reported on
//! its own; callers rely on getting exactly one message back.

use crate::errors::ValidationError;
use crate::models::Lead;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const INVALID_EMAIL: &str = "Invalid email format";

// Local part may not start with '.' and must end on a non-dot character;
// "no consecutive dots" is checked separately since `regex` has no lookahead.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email regex is valid")
});

/// Checks an address against the accepted email grammar.
///
/// The input is expected to be trimmed already.
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_REGEX.is_match(email)
}

/// Validates an arbitrary JSON value into a normalized [`Lead`].
///
/// - `email` is required and must pass [`is_valid_email`] after trimming.
/// - `clinic_name`, `clinic_type` and `website` are optional strings, trimmed
///   when present; `clinic_type` is also lower-cased.
/// - Absent optional fields stay `None`, never `Some("")`.
/// - Unknown fields are ignored.
pub fn validate_lead(input: &Value) -> Result<Lead, ValidationError> {
    let object = input.as_object().ok_or_else(|| {
        ValidationError::new(format!("Expected object, received {}", json_type(input)))
    })?;

    let clinic_name = optional_string(object, "clinic_name")?;
    let clinic_type = optional_string(object, "clinic_type")?.map(|t| t.to_lowercase());
    let email = required_email(object)?;
    let website = optional_string(object, "website")?;

    Ok(Lead {
        clinic_name,
        clinic_type,
        email,
        website,
    })
}

fn optional_string(object: &Map<String, Value>, field: &str) -> Result<Option<String>, ValidationError> {
    match object.get(field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(ValidationError::new(format!(
            "Expected string, received {}",
            json_type(other)
        ))),
    }
}

fn required_email(object: &Map<String, Value>) -> Result<String, ValidationError> {
    let email = object
        .get("email")
        .and_then(Value::as_str)
        .map(str::trim)
        .ok_or_else(|| ValidationError::new(INVALID_EMAIL))?;

    if !is_valid_email(email) {
        return Err(ValidationError::new(INVALID_EMAIL));
    }

    Ok(email.to_string())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
