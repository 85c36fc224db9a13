//! Field-keyed validation errors and the value validators used by the write path.
//!
//! Messages follow the wording clients of the course API already parse
//! ("This field is required.", "Enter a valid email address.", ...).

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const INVALID_URL: &str = "Enter a valid URL.";
pub const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
pub const INVALID_INTEGER: &str = "A valid integer is required.";
pub const INVALID_DURATION: &str =
    "Duration has wrong format. Use one of these formats instead: [DD] [HH:[MM:]]ss[.uuuuuu].";

/// Result of validating a single field: the cleaned value or its messages.
pub type FieldResult<T> = Result<T, Vec<String>>;

/// Field name -> list of messages.
///
/// `BTreeMap` keeps the serialized mapping stable, which keeps API responses
/// (and test assertions) deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("validation failed for fields: {}", field_list(.0))]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

fn field_list(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors.keys().cloned().collect::<Vec<_>>().join(", ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience for a single-field error.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn extend(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        let entry = self.0.entry(field.to_string()).or_default();
        entry.extend(messages);
        if entry.is_empty() {
            self.0.remove(field);
        }
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.0 {
            self.extend(&field, messages);
        }
    }

    /// Record a field result; returns the cleaned value on success.
    pub fn check<T>(&mut self, field: &str, result: FieldResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(messages) => {
                self.extend(field, messages);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn fail<T>(message: impl Into<String>) -> FieldResult<T> {
    Err(vec![message.into()])
}

/// Non-null string, trimmed. Blank strings are rejected.
pub fn required_string(value: &Value, max_length: usize) -> FieldResult<String> {
    match value {
        Value::Null => fail(NOT_NULL),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return fail(NOT_BLANK);
            }
            max_length_of(trimmed, max_length)?;
            Ok(trimmed.to_string())
        }
        _ => fail(NOT_A_STRING),
    }
}

/// Nullable string; `null` and `""` both clear the field.
pub fn optional_string(value: &Value, max_length: usize) -> FieldResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => {
            let trimmed = s.trim();
            max_length_of(trimmed, max_length)?;
            Ok(Some(trimmed.to_string()))
        }
        _ => fail(NOT_A_STRING),
    }
}

/// Free text (no length limit); `null` clears it.
pub fn optional_text(value: &Value) -> FieldResult<Option<String>> {
    optional_string(value, usize::MAX)
}

fn max_length_of(s: &str, max_length: usize) -> FieldResult<()> {
    if s.chars().count() > max_length {
        return fail(format!(
            "Ensure this field has no more than {max_length} characters."
        ));
    }
    Ok(())
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    )
    .expect("email pattern is valid")
});

/// Email address, normalized by lower-casing the domain part.
pub fn email(value: &Value) -> FieldResult<String> {
    let raw = required_string(value, 254)?;
    if !EMAIL_RE.is_match(&raw) {
        return fail(INVALID_EMAIL);
    }
    Ok(normalize_email(&raw))
}

pub fn normalize_email(raw: &str) -> String {
    match raw.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => raw.to_string(),
    }
}

/// Nullable http(s) URL.
pub fn optional_url(value: &Value, max_length: usize) -> FieldResult<Option<String>> {
    let Some(raw) = optional_string(value, max_length)? else {
        return Ok(None);
    };
    required_url_str(&raw).map(Some)
}

pub fn required_url(value: &Value, max_length: usize) -> FieldResult<String> {
    let raw = required_string(value, max_length)?;
    required_url_str(&raw)
}

fn required_url_str(raw: &str) -> FieldResult<String> {
    match url::Url::parse(raw) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => {
            Ok(raw.to_string())
        }
        _ => fail(INVALID_URL),
    }
}

pub fn boolean(value: &Value) -> FieldResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => fail(INVALID_BOOLEAN),
        },
        Value::Number(n) if n.as_u64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_u64() == Some(0) => Ok(false),
        Value::Null => fail(NOT_NULL),
        _ => fail(INVALID_BOOLEAN),
    }
}

/// Non-negative integer; numeric strings are accepted as form input.
pub fn positive_integer(value: &Value) -> FieldResult<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        Value::Null => return fail(NOT_NULL),
        _ => None,
    };
    parsed
        .and_then(|n| u32::try_from(n).ok())
        .map_or_else(|| fail(INVALID_INTEGER), Ok)
}

/// Duration in seconds. Accepts a number of seconds or `[DD ][HH:[MM:]]ss`.
pub fn duration_secs(value: &Value) -> FieldResult<u64> {
    match value {
        Value::Number(n) => n.as_u64().map_or_else(|| fail(INVALID_DURATION), Ok),
        Value::String(s) => parse_duration(s.trim()).map_or_else(|| fail(INVALID_DURATION), Ok),
        Value::Null => fail(NOT_NULL),
        _ => fail(INVALID_DURATION),
    }
}

fn parse_duration(s: &str) -> Option<u64> {
    let (days, clock) = match s.split_once(' ') {
        Some((d, rest)) => (d.parse::<u64>().ok()?, rest.trim()),
        None => (0, s),
    };
    let parts: Vec<&str> = clock.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }
    let mut total = 0u64;
    for part in &parts {
        let n = part.split('.').next()?.parse::<u64>().ok()?;
        total = total.checked_mul(60)?.checked_add(n)?;
    }
    days.checked_mul(86_400)?.checked_add(total)
}
