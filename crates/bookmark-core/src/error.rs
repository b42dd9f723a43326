use crate::bookmark::BookmarkId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Machine readable code attached to every field error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "BOOKMARKS_INVALID_LINK")]
    InvalidLink,
    #[serde(rename = "BOOKMARKS_BLOCKED_DOMAIN")]
    BlockedDomain,
    #[serde(rename = "BOOKMARKS_INVALID_GUID")]
    InvalidGuid,
    #[serde(rename = "BOOKMARKS_INVALID_PARAMETER")]
    InvalidParameter,
    #[serde(rename = "BOOKMARKS_MISSING_PARAMETER")]
    MissingParameter,
    #[serde(rename = "BOOKMARKS_INVALID_TYPE")]
    InvalidType,
    #[serde(rename = "BOOKMARKS_NOT_FOUND")]
    NotFound,
    #[serde(rename = "BOOKMARKS_BACKEND")]
    Backend,
}

/// A single problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub code: ErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Field-scoped validation failures, keyed by the offending field name.
///
/// Serializes as `{"<field>": [{"code": ..., "message": ...}]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<FieldError>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a set holding exactly one error.
    pub fn single(field: impl Into<String>, error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.add(field, error);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, error: FieldError) {
        self.0.entry(field.into()).or_default().push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the errors recorded for `field`, if any.
    pub fn field(&self, field: &str) -> Option<&[FieldError]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Returns `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, errors) in &self.0 {
            for error in errors {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {error}")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("bookmark already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Which outbound request of a preview failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Page,
    Whois,
}

impl Display for FetchTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchTarget::Page => f.write_str("page"),
            FetchTarget::Whois => f.write_str("whois"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PreviewError {
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("invalid url for {target} request: {message}")]
    InvalidUrl {
        target: FetchTarget,
        message: String,
    },
    #[error("{target} request failed: {message}")]
    Request {
        target: FetchTarget,
        message: String,
    },
    #[error("{target} request returned status {status}")]
    Status { target: FetchTarget, status: u16 },
    #[error("{target} request timed out")]
    Timeout { target: FetchTarget },
    #[error("failed to read {target} response body: {message}")]
    Body {
        target: FetchTarget,
        message: String,
    },
}

/// Errors surfaced by [`BookmarkService`](crate::service::BookmarkService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("bookmark not found: {0}")]
    NotFound(BookmarkId),
    #[error("{action}: {source}")]
    Storage {
        action: &'static str,
        #[source]
        source: StorageError,
    },
    #[error("{action}: {source}")]
    Upstream {
        action: &'static str,
        #[source]
        source: PreviewError,
    },
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        ServiceError::Validation(errors)
    }
}
