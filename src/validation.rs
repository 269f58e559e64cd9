//! Field validation rules.
//!
//! Pure, deterministic checks for a single input. Messages are shown to the
//! user verbatim, so they must not change.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::field::{FieldKind, FieldName};

/// Minimum number of characters in a password.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Whitespace as JavaScript's `\s` sees it. Rust's `\s` also matches U+0085 and
/// misses U+FEFF.
const WHITESPACE: &str =
    r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let part = format!("[^{WHITESPACE}@]+");
    Regex::new(&format!(r"^{part}@{part}\.{part}$")).expect("email pattern is valid")
});

/// A single failed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Enter a valid email")]
    InvalidEmail,

    #[error("Minimum 6 characters")]
    TooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Sibling values some rules need.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    /// The password being confirmed, for the match rule.
    pub password: Option<&'a str>,
}

/// Check one value against the rule for `kind`.
pub fn validate(
    kind: FieldKind,
    value: &str,
    context: &ValidationContext<'_>,
) -> Result<(), ValidationError> {
    match kind {
        FieldKind::Email => {
            if EMAIL_PATTERN.is_match(value) {
                Ok(())
            } else {
                Err(ValidationError::InvalidEmail)
            }
        }
        FieldKind::Password => check_length(value),
        FieldKind::ConfirmPassword => {
            check_length(value)?;
            // Only compared once both sides pass the length rule.
            match context.password {
                Some(password) if check_length(password).is_ok() && password != value => {
                    Err(ValidationError::PasswordMismatch)
                }
                _ => Ok(()),
            }
        }
    }
}

fn check_length(value: &str) -> Result<(), ValidationError> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        Err(ValidationError::TooShort)
    } else {
        Ok(())
    }
}

/// Errors for every field currently failing its rule.
///
/// A missing key means the field passed or has no rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<FieldName, ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: FieldName) -> Option<ValidationError> {
        self.0.get(&field).copied()
    }

    /// User-facing message for a field, if it failed.
    pub fn message(&self, field: FieldName) -> Option<String> {
        self.get(field).map(|e| e.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, ValidationError)> + '_ {
        self.0.iter().map(|(k, v)| (*k, *v))
    }

    /// Field name to message, the shape presenters render.
    pub fn to_messages(&self) -> BTreeMap<FieldName, String> {
        self.0.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_messages().serialize(serializer)
    }
}

/// Run every applicable rule over a form's values.
pub fn validate_all(values: &BTreeMap<FieldName, String>) -> ValidationErrors {
    let context = ValidationContext {
        password: values.get(&FieldName::Password).map(String::as_str),
    };

    let mut errors = ValidationErrors::new();
    for (field, value) in values {
        let Some(kind) = field.kind() else {
            continue;
        };
        if let Err(e) = validate(kind, value, &context) {
            errors.0.insert(*field, e);
        }
    }
    errors
}
