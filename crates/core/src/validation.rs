//! Field validators for employee records.
//!
//! Validators are pure and independent of the HTTP layer. Full validation of a
//! create/replace body collects every failing field, in declaration order.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{ser::SerializeMap, Serialize, Serializer};
use thiserror::Error;

use crate::types::EmployeeDraft;

pub const NAME_FIELD: &str = "name";
pub const POSITION_FIELD: &str = "position";
pub const SALARY_FIELD: &str = "salary";
pub const EMAIL_FIELD: &str = "email";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("valid email regex")
});

/// Business rule violated by a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("email must be a valid address")]
    InvalidEmail,
}

impl ValidationError {
    /// Returns the name of the field the rule applies to.
    pub fn field(self) -> &'static str {
        match self {
            Self::EmptyName => NAME_FIELD,
            Self::InvalidEmail => EMAIL_FIELD,
        }
    }
}

/// Fails when the name is absent or blank after trimming.
///
/// Trimming strips ASCII control characters and spaces (everything up to
/// U+0020) but keeps other Unicode whitespace such as U+00A0.
pub fn validate_name(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(name) if !name.trim_matches(|c: char| c <= ' ').is_empty() => Ok(()),
        _ => Err(ValidationError::EmptyName),
    }
}

/// Fails when an email is present and does not look like `local@domain`.
pub fn validate_email(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(email) if !EMAIL_RE.is_match(email) => Err(ValidationError::InvalidEmail),
        _ => Ok(()),
    }
}

/// Runs every field rule against a create/replace body.
pub fn validate_employee(draft: &EmployeeDraft) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if let Err(err) = validate_name(draft.name.as_deref()) {
        errors.push_violation(err);
    }

    // Create and replace accept an empty email; only non-empty ones must match.
    let email = draft.email.as_deref().filter(|value| !value.is_empty());
    if let Err(err) = validate_email(email) {
        errors.push_violation(err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Ordered field to message mapping, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(&'static str, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message for `field`, replacing an earlier one for the same field.
    pub fn push<S: Into<String>>(&mut self, field: &'static str, message: S) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    pub fn push_violation(&mut self, err: ValidationError) {
        self.push(err.field(), err.to_string());
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, message)| message.as_str())
    }

    #[cfg(test)]
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<ValidationError> for FieldErrors {
    fn from(value: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.push_violation(value);
        errors
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.entries.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl Serialize for FieldErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, message) in &self.entries {
            map.serialize_entry(field, message)?;
        }
        map.end()
    }
}
