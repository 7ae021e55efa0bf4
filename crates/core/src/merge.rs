//! Partial updates of employee records.
//!
//! A patch is a sparse JSON object. Only recognized keys are applied, each one
//! validated on its own, and the first failing field aborts the merge.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::Employee;
use crate::validation::{
    validate_email, validate_name, FieldErrors, ValidationError, EMAIL_FIELD, NAME_FIELD,
    POSITION_FIELD, SALARY_FIELD,
};

/// Reasons a patch cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("{field} must be {expected}")]
    InvalidFieldType {
        field: &'static str,
        expected: &'static str,
    },
}

impl PatchError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::Invalid(err) => err.field(),
            Self::InvalidFieldType { field, .. } => *field,
        }
    }

    /// Single entry error map reported to the client.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.push(self.field(), self.to_string());
        errors
    }
}

/// Applies `updates` onto `employee` and returns the merged record.
///
/// The input is consumed, so a failed merge leaves nothing half-applied for
/// the caller to persist. An update without recognized keys returns the
/// record unchanged.
pub fn merge_patch(
    mut employee: Employee,
    updates: &Map<String, Value>,
) -> Result<Employee, PatchError> {
    if let Some(value) = updates.get(NAME_FIELD) {
        let name = optional_str(NAME_FIELD, value)?;
        validate_name(name)?;
        if let Some(name) = name {
            employee.name = name.to_string();
        }
    }

    if let Some(value) = updates.get(POSITION_FIELD) {
        employee.position = optional_str(POSITION_FIELD, value)?.map(str::to_string);
    }

    if let Some(value) = updates.get(SALARY_FIELD) {
        employee.salary = value.as_f64().ok_or(PatchError::InvalidFieldType {
            field: SALARY_FIELD,
            expected: "a number",
        })?;
    }

    if let Some(value) = updates.get(EMAIL_FIELD) {
        let email = optional_str(EMAIL_FIELD, value)?;
        validate_email(email)?;
        employee.email = email.map(str::to_string);
    }

    Ok(employee)
}

fn optional_str<'a>(field: &'static str, value: &'a Value) -> Result<Option<&'a str>, PatchError> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        _ => Err(PatchError::InvalidFieldType {
            field,
            expected: "a string or null",
        }),
    }
}
