//! HTTP handlers for `/api/employees`.
//!
//! Create and replace validate the whole body and report every failing field.
//! Patch merges a sparse object and reports only the first failing field.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use serde_json::{Map, Value};
use tracing::{error, info};

use personnel_core::{merge_patch, Employee, EmployeeDraft, EmployeeId, FieldErrors};
use personnel_storage::StorageError;

use crate::problem::ProblemResponse;
use crate::router::AppState;

const STAGE: &str = "employees";

/// Successful or client-attributable outcome of an employee request.
#[derive(Debug)]
pub enum EmployeeResponse {
    Record(Employee),
    Records(Vec<Employee>),
    Invalid(FieldErrors),
    NotFound,
    Deleted,
}

impl IntoResponse for EmployeeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Record(employee) => Json(employee).into_response(),
            Self::Records(employees) => Json(employees).into_response(),
            Self::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Deleted => StatusCode::OK.into_response(),
        }
    }
}

type HandlerResult = Result<EmployeeResponse, ProblemResponse>;

pub async fn list(State(state): State<AppState>) -> HandlerResult {
    let employees = state
        .storage()
        .employees()
        .find_all()
        .await
        .map_err(storage_failure("list"))?;

    record("list", "ok");
    Ok(EmployeeResponse::Records(employees))
}

pub async fn fetch(State(state): State<AppState>, Path(id): Path<EmployeeId>) -> HandlerResult {
    let found = state
        .storage()
        .employees()
        .find_by_id(id)
        .await
        .map_err(storage_failure("get"))?;

    Ok(match found {
        Some(employee) => {
            record("get", "ok");
            EmployeeResponse::Record(employee)
        }
        None => not_found("get", id),
    })
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> HandlerResult {
    let draft = decode_draft("create", &body)?;
    let employee = match draft.into_employee(None) {
        Ok(employee) => employee,
        Err(errors) => return Ok(rejected("create", errors)),
    };

    let saved = state
        .storage()
        .employees()
        .save(&employee)
        .await
        .map_err(storage_failure("create"))?;

    info!(stage = STAGE, op = "create", id = ?saved.id, "employee created");
    record("create", "ok");
    Ok(EmployeeResponse::Record(saved))
}

pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    body: Bytes,
) -> HandlerResult {
    let draft = decode_draft("replace", &body)?;
    let employee = match draft.into_employee(Some(id)) {
        Ok(employee) => employee,
        Err(errors) => return Ok(rejected("replace", errors)),
    };

    let repo = state.storage().employees();
    if repo
        .find_by_id(id)
        .await
        .map_err(storage_failure("replace"))?
        .is_none()
    {
        return Ok(not_found("replace", id));
    }

    let saved = match repo.save(&employee).await {
        Ok(saved) => saved,
        Err(StorageError::MissingRecord(_)) => return Ok(not_found("replace", id)),
        Err(err) => return Err(storage_failure("replace")(err)),
    };

    info!(stage = STAGE, op = "replace", id, "employee replaced");
    record("replace", "ok");
    Ok(EmployeeResponse::Record(saved))
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<EmployeeId>,
    body: Bytes,
) -> HandlerResult {
    let updates: Map<String, Value> = serde_json::from_slice(&body).map_err(|err| {
        record("patch", "invalid_payload");
        ProblemResponse::invalid_payload(format!("patch body must be a JSON object: {err}"))
    })?;

    let repo = state.storage().employees();
    let Some(existing) = repo
        .find_by_id(id)
        .await
        .map_err(storage_failure("patch"))?
    else {
        return Ok(not_found("patch", id));
    };

    let merged = match merge_patch(existing, &updates) {
        Ok(merged) => merged,
        Err(err) => return Ok(rejected("patch", err.field_errors())),
    };

    let saved = match repo.save(&merged).await {
        Ok(saved) => saved,
        Err(StorageError::MissingRecord(_)) => return Ok(not_found("patch", id)),
        Err(err) => return Err(storage_failure("patch")(err)),
    };

    info!(stage = STAGE, op = "patch", id, fields = updates.len(), "employee patched");
    record("patch", "ok");
    Ok(EmployeeResponse::Record(saved))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<EmployeeId>) -> HandlerResult {
    let repo = state.storage().employees();
    let removed = repo
        .delete_by_id(id)
        .await
        .map_err(storage_failure("delete"))?;

    if !removed {
        return Ok(not_found("delete", id));
    }

    info!(stage = STAGE, op = "delete", id, "employee deleted");
    record("delete", "ok");
    Ok(EmployeeResponse::Deleted)
}

fn decode_draft(op: &'static str, body: &[u8]) -> Result<EmployeeDraft, ProblemResponse> {
    serde_json::from_slice(body).map_err(|err| {
        info!(stage = STAGE, op, error = %err, "rejected undecodable employee body");
        record(op, "invalid_payload");
        ProblemResponse::invalid_payload(format!("failed to parse employee: {err}"))
    })
}

fn rejected(op: &'static str, errors: FieldErrors) -> EmployeeResponse {
    info!(stage = STAGE, op, %errors, "validation failed");
    record(op, "invalid");
    EmployeeResponse::Invalid(errors)
}

fn not_found(op: &'static str, id: EmployeeId) -> EmployeeResponse {
    info!(stage = STAGE, op, id, "employee not found");
    record(op, "not_found");
    EmployeeResponse::NotFound
}

fn storage_failure(op: &'static str) -> impl FnOnce(StorageError) -> ProblemResponse {
    move |err| {
        error!(stage = STAGE, op, error = %err, "record store failure");
        record(op, "error");
        ProblemResponse::storage_unavailable()
    }
}

fn record(op: &'static str, result: &'static str) {
    counter!("employee_requests_total", "op" => op, "result" => result).increment(1);
}
