//! Field validation functions used at the request boundary.
//!
//! Every check is a plain function returning `Result<_, FieldError>`; the
//! caller decides which field name the error is recorded under.

use crate::error::{ErrorCode, FieldError};
use serde_json::Value;
use std::collections::HashSet;
use url::Url;

/// Hostnames rejected as bookmark targets unless configured otherwise.
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] = &["yahoo.com", "socket.io"];

/// Maximum number of characters stored for a link.
pub const MAX_LINK_LENGTH: usize = 256;

/// Whether a field has to be present in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Validates bookmark links against URL syntax and the blocked-domain set.
#[derive(Debug, Clone)]
pub struct LinkValidator {
    blocked_domains: HashSet<String>,
}

impl LinkValidator {
    /// Creates a validator rejecting the given hostnames (compared case-insensitively).
    pub fn new<I, S>(blocked_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blocked_domains = blocked_domains
            .into_iter()
            .map(|domain| domain.as_ref().trim().to_ascii_lowercase())
            .filter(|domain| !domain.is_empty())
            .collect();
        Self { blocked_domains }
    }

    pub fn is_blocked(&self, hostname: &str) -> bool {
        self.blocked_domains
            .contains(&hostname.to_ascii_lowercase())
    }

    /// Validates a raw `link` value.
    ///
    /// Returns `Ok(None)` only for an absent optional link.
    pub fn validate(
        &self,
        value: Option<&Value>,
        presence: Presence,
    ) -> Result<Option<String>, FieldError> {
        let link = match value {
            None if presence == Presence::Optional => return Ok(None),
            None => return Err(invalid_link()),
            Some(Value::String(link)) => link,
            Some(_) => return Err(invalid_link()),
        };

        self.check_link(link)?;
        Ok(Some(link.clone()))
    }

    fn check_link(&self, link: &str) -> Result<(), FieldError> {
        if link.chars().count() > MAX_LINK_LENGTH {
            return Err(invalid_link());
        }

        // The URL parser silently drops these; the stored link must be what was checked.
        if link.trim() != link || link.chars().any(|c| c.is_ascii_control()) {
            return Err(invalid_link());
        }

        let url = Url::parse(link).map_err(|_| invalid_link())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid_link());
        }

        let hostname = url.host_str().ok_or_else(invalid_link)?;
        if self.is_blocked(hostname) {
            return Err(FieldError::new(
                ErrorCode::BlockedDomain,
                format!("{hostname} banned"),
            ));
        }

        Ok(())
    }
}

impl Default for LinkValidator {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_DOMAINS)
    }
}

fn invalid_link() -> FieldError {
    FieldError::new(ErrorCode::InvalidLink, "Invalid link")
}

/// A string field that may be omitted but must not be empty when present.
pub fn optional_text(value: Option<&Value>, field: &str) -> Result<Option<String>, FieldError> {
    match value {
        None => Ok(None),
        Some(Value::String(text)) if !text.is_empty() => Ok(Some(text.clone())),
        Some(Value::String(_)) => Err(FieldError::new(
            ErrorCode::MissingParameter,
            format!("Bookmark {field} can't be blank"),
        )),
        Some(_) => Err(FieldError::new(
            ErrorCode::InvalidType,
            format!("Bookmark {field} must be of type string"),
        )),
    }
}

/// A non-empty string field that has to be present.
pub fn required_text(value: Option<&Value>, field: &str) -> Result<String, FieldError> {
    optional_text(value, field)?.ok_or_else(|| {
        FieldError::new(
            ErrorCode::MissingParameter,
            format!("Bookmark {field} can't be blank"),
        )
    })
}

/// A boolean field that may be omitted.
pub fn optional_flag(value: Option<&Value>, field: &str) -> Result<Option<bool>, FieldError> {
    match value {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(FieldError::new(
            ErrorCode::InvalidType,
            format!("Bookmark {field} must be of type boolean"),
        )),
    }
}
