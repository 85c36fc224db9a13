//! Password pair validation (match check + strength policy).

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::validation::{self, FieldResult, ValidationErrors};

pub const MISMATCH: &str = "The two password fields didn't match.";
pub const TOO_COMMON: &str = "This password is too common.";
pub const ENTIRELY_NUMERIC: &str = "This password is entirely numeric.";

const COMMON_PASSWORDS: &[&str] = &[
    "000000", "111111", "123123", "123456", "1234567", "12345678", "123456789", "1234567890",
    "1q2w3e4r", "654321", "abc123", "admin", "admin123", "baseball", "dragon", "football",
    "freedom", "hello123", "iloveyou", "letmein", "master", "michael", "monkey", "passw0rd",
    "password", "password1", "password123", "princess", "qwerty", "qwerty123", "qwertyuiop",
    "shadow", "sunshine", "superman", "trustno1", "welcome", "whatever", "zaq12wsx",
];

/// Overlap ratio at which a password counts as too similar to an account attribute.
const MAX_SIMILARITY: f64 = 0.7;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W+").expect("separator pattern is valid"));

/// Strength rules applied to every new password.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

impl PasswordPolicy {
    /// `attributes` are (label, value) pairs of the account the password is for,
    /// e.g. `("email", "jane@example.com")`.
    pub fn validate(&self, password: &str, attributes: &[(&str, &str)]) -> FieldResult<()> {
        let mut messages = Vec::new();

        if let Some(label) = too_similar(password, attributes) {
            messages.push(format!("The password is too similar to the {label}."));
        }
        if password.chars().count() < self.min_length {
            messages.push(format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            ));
        }
        if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
            messages.push(TOO_COMMON.to_string());
        }
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            messages.push(ENTIRELY_NUMERIC.to_string());
        }

        if messages.is_empty() { Ok(()) } else { Err(messages) }
    }
}

/// Label of the first attribute whose value, or one of its word parts,
/// shares at least `MAX_SIMILARITY` of its characters with the password.
fn too_similar<'a>(password: &str, attributes: &[(&'a str, &str)]) -> Option<&'a str> {
    let password = password.to_lowercase();
    attributes.iter().find_map(|(label, value)| {
        let value = value.to_lowercase();
        let similar = NON_WORD
            .split(&value)
            .chain(std::iter::once(value.as_str()))
            .filter(|part| !dwarfed(&password, part))
            .any(|part| quick_ratio(&password, part) >= MAX_SIMILARITY);
        similar.then_some(*label)
    })
}

/// A part this much shorter than the password cannot make it guessable.
fn dwarfed(password: &str, part: &str) -> bool {
    let password_len = password.chars().count();
    let part_len = part.chars().count();
    password_len >= 10 * part_len && (part_len as f64) < MAX_SIMILARITY / 2.0 * password_len as f64
}

/// `2 * shared / (len(a) + len(b))`, counting shared characters as a multiset
/// regardless of order. An upper bound on the longest-matching-blocks ratio.
fn quick_ratio(a: &str, b: &str) -> f64 {
    let total = a.chars().count() + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }
    let shared = a
        .chars()
        .filter(|c| match available.get_mut(c) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        })
        .count();
    2.0 * shared as f64 / total as f64
}

/// Two fields carrying the same new password.
#[derive(Debug, Clone, Copy)]
pub struct PasswordPair {
    pub first: &'static str,
    pub second: &'static str,
}

impl PasswordPair {
    /// Registration form fields.
    pub const REGISTER: Self = Self {
        first: "password1",
        second: "password2",
    };

    /// Password reset / change form fields.
    pub const RESET: Self = Self {
        first: "new_password1",
        second: "new_password2",
    };

    /// Returns the accepted password. Strength messages land on the first field,
    /// the mismatch message on the second.
    pub fn validate(
        &self,
        payload: &Map<String, Value>,
        policy: &PasswordPolicy,
        attributes: &[(&str, &str)],
    ) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let first = self.raw(payload, self.first, &mut errors);
        let second = self.raw(payload, self.second, &mut errors);

        if let (Some(first), Some(second)) = (first, second) {
            if first != second {
                errors.add(self.second, MISMATCH);
            }
            errors.check(self.first, policy.validate(&first, attributes));
            return errors.into_result(first);
        }
        Err(errors)
    }

    fn raw(
        &self,
        payload: &Map<String, Value>,
        field: &str,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        match payload.get(field) {
            None => {
                errors.add(field, validation::REQUIRED);
                None
            }
            // passwords are not trimmed
            Some(Value::String(s)) if s.is_empty() => {
                errors.add(field, validation::NOT_BLANK);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) => {
                errors.add(field, validation::NOT_NULL);
                None
            }
            Some(_) => {
                errors.add(field, validation::NOT_A_STRING);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    const ACCOUNT: &[(&str, &str)] = &[("email", "testuser@example.com"), ("name", "Test User")];

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn strong_matching_pair_is_accepted() {
        let p = payload(json!({"password1": "strong_password123", "password2": "strong_password123"}));
        let accepted = PasswordPair::REGISTER
            .validate(&p, &PasswordPolicy::default(), ACCOUNT)
            .unwrap();
        assert_eq!(accepted, "strong_password123");
    }

    #[test]
    fn mismatched_short_pair_reports_both_problems() {
        let p = payload(json!({"new_password1": "abc", "new_password2": "xyz"}));
        let errors = PasswordPair::RESET
            .validate(&p, &PasswordPolicy::default(), ACCOUNT)
            .unwrap_err();

        assert_eq!(errors.get("new_password2").unwrap(), [MISMATCH]);
        let first = errors.get("new_password1").unwrap();
        assert!(first[0].starts_with("This password is too short"));
    }

    #[rstest]
    #[case("password", TOO_COMMON)]
    #[case("8675309123", ENTIRELY_NUMERIC)]
    #[case("testuser2024", "The password is too similar to the email.")]
    #[case("tsetresu99", "The password is too similar to the email.")]
    #[case("TEST-USER", "The password is too similar to the email.")]
    fn weak_passwords(#[case] password: &str, #[case] expected: &str) {
        let result = PasswordPolicy::default().validate(password, ACCOUNT);
        let messages = result.unwrap_err();
        assert!(messages.iter().any(|m| m == expected), "{messages:?}");
    }

    #[test]
    fn missing_fields_are_required() {
        let errors = PasswordPair::RESET
            .validate(&Map::new(), &PasswordPolicy::default(), ACCOUNT)
            .unwrap_err();
        assert_eq!(errors.get("new_password1").unwrap(), [validation::REQUIRED]);
        assert_eq!(errors.get("new_password2").unwrap(), [validation::REQUIRED]);
    }

    #[rstest]
    #[case("strong_password123")]
    #[case("testuser-is-my-name-and-more-text")]
    #[case("example.com-is-a-domain")]
    fn dissimilar_passwords_pass(#[case] password: &str) {
        assert_eq!(PasswordPolicy::default().validate(password, ACCOUNT), Ok(()));
    }

    #[rstest]
    #[case("abcd", "abcd", 1.0)]
    #[case("abcd", "dcba", 1.0)]
    #[case("testuser2024", "testuser", 0.8)]
    #[case("abc", "xyz", 0.0)]
    #[case("", "", 1.0)]
    fn quick_ratio_counts_shared_characters(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        assert!((quick_ratio(a, b) - expected).abs() < 1e-9);
    }
}
