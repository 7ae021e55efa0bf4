//! Domain layer for the personnel service: the employee record, its field
//! validators and the partial-update merge. Nothing here performs I/O.

pub mod merge;
pub mod types;
pub mod validation;

pub use merge::{merge_patch, PatchError};
pub use types::{Employee, EmployeeDraft, EmployeeId};
pub use validation::{
    validate_email, validate_employee, validate_name, FieldErrors, ValidationError,
};
