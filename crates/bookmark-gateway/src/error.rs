use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookmark_core::{BookmarkId, ErrorCode, FieldError, ServiceError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, AppError>;

pub const NOT_FOUND_MESSAGE: &str = "Bookmark with that ID doesn't exist";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("invalid request body: {0}")]
    Body(String),
    #[error("invalid query string: {0}")]
    Query(String),
    #[error("invalid path: {0}")]
    Path(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Body(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Path(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Query(rejection.body_text())
    }
}

/// `{"errors": {"<field>": [{"code": ..., "message": ...}]}}`
#[derive(Serialize)]
struct ErrorEnvelope {
    errors: ValidationErrors,
}

impl AppError {
    fn status_and_errors(self) -> (StatusCode, ValidationErrors) {
        match self {
            AppError::Service(ServiceError::Validation(errors)) => {
                (StatusCode::BAD_REQUEST, errors)
            }
            AppError::Service(ServiceError::NotFound(_)) => (
                StatusCode::NOT_FOUND,
                backend(ErrorCode::NotFound, NOT_FOUND_MESSAGE),
            ),
            AppError::Service(ServiceError::Storage { action, .. })
            | AppError::Service(ServiceError::Upstream { action, .. }) => (
                StatusCode::BAD_REQUEST,
                backend(ErrorCode::Backend, action),
            ),
            AppError::Body(message) => (
                StatusCode::BAD_REQUEST,
                ValidationErrors::single(
                    "body",
                    FieldError::new(ErrorCode::InvalidParameter, message),
                ),
            ),
            AppError::Path(_) => (
                StatusCode::BAD_REQUEST,
                ValidationErrors::single("id", BookmarkId::invalid()),
            ),
            AppError::Query(message) => (
                StatusCode::BAD_REQUEST,
                ValidationErrors::single(
                    "query",
                    FieldError::new(ErrorCode::InvalidParameter, message),
                ),
            ),
        }
    }
}

fn backend(code: ErrorCode, message: &str) -> ValidationErrors {
    ValidationErrors::single("backend", FieldError::new(code, message))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        debug!(error = %self, "request failed");
        let (status, errors) = self.status_and_errors();
        (status, Json(ErrorEnvelope { errors })).into_response()
    }
}
