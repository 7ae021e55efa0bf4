use serde::{Deserialize, Serialize};

use crate::validation::{validate_employee, FieldErrors};

/// Identifier assigned by the record store on first save.
pub type EmployeeId = i64;

/// Employee record as persisted by the store and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub id: Option<EmployeeId>,
    pub name: String,
    pub position: Option<String>,
    pub salary: f64,
    pub email: Option<String>,
}

impl Employee {
    /// Builds an unsaved record. The store assigns the id.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            id: None,
            name: name.into(),
            position: None,
            salary: 0.0,
            email: None,
        }
    }

    pub fn with_position<S: Into<String>>(mut self, position: S) -> Self {
        self.position = Some(position.into());
        self
    }

    pub fn with_salary(mut self, salary: f64) -> Self {
        self.salary = salary;
        self
    }

    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Client supplied body for create and replace requests.
///
/// Every field is optional so that a missing `name` is reported by validation
/// rather than by the JSON decoder. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmployeeDraft {
    #[serde(default)]
    pub id: Option<EmployeeId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub email: Option<String>,
}

impl EmployeeDraft {
    /// Validates every field and converts the draft into a record carrying `id`.
    ///
    /// The id embedded in the body is discarded; callers decide identity.
    pub fn into_employee(self, id: Option<EmployeeId>) -> Result<Employee, FieldErrors> {
        validate_employee(&self)?;

        Ok(Employee {
            id,
            name: self.name.unwrap_or_default(),
            position: self.position,
            salary: self.salary.unwrap_or_default(),
            email: self.email,
        })
    }
}
