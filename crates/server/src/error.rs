//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use admin::ValidationErrors;

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable bearer token on the request.
    #[error("authentication required")]
    Unauthorized,

    /// The principal lacks the capability for the operation. The body
    /// stays generic; the detail goes to the log only.
    #[error("forbidden")]
    Forbidden(String),

    /// The submitted form failed validation; field errors are echoed.
    #[error("validation failed")]
    Validation(ValidationErrors),

    /// The target record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything else.
    #[error("internal error")]
    Internal(String),
}

impl From<admin::Error> for ApiError {
    fn from(e: admin::Error) -> Self {
        match e {
            admin::Error::Denied(denied) => ApiError::Forbidden(denied.to_string()),
            admin::Error::Validation(errors) => ApiError::Validation(errors),
            admin::Error::Storage(storage::Error::NotFound(what)) => ApiError::NotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication required" })),
            )
                .into_response(),
            ApiError::Forbidden(detail) => {
                tracing::warn!(%detail, "request forbidden");
                (StatusCode::FORBIDDEN, Json(json!({ "error": "forbidden" }))).into_response()
            }
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errors": errors.fields })),
            )
                .into_response(),
            ApiError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("not found: {what}") })),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal error" })),
                )
                    .into_response()
            }
        }
    }
}
