use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use dovic_core::DomainError;

/// Map the domain taxonomy onto HTTP. Storage and dependency faults are
/// logged server-side and surfaced as an opaque 500.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvalidTransition { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_transition", err.to_string())
        }
        DomainError::InvalidStatus(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_status", msg)
        }
        DomainError::SystemStatusConflict(msg) => {
            json_error(StatusCode::CONFLICT, "system_status_conflict", msg)
        }
        DomainError::Locked(msg) => json_error(StatusCode::BAD_REQUEST, "shipment_locked", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "forbidden", "forbidden"),
        DomainError::Dependency(msg) => {
            tracing::error!(error = %msg, "dependency failure surfaced to a handler");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
        DomainError::Storage(msg) => {
            tracing::error!(error = %msg, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
