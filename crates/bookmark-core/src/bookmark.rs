use crate::error::{ErrorCode, FieldError};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Length of a hyphenated identifier, e.g. `0f8fad5b-d9cb-469f-a165-70867728950e`.
const ID_LENGTH: usize = 36;
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Smallest step `updated_at` advances by; matches the stored precision.
pub const UPDATE_RESOLUTION: SignedDuration = SignedDuration::from_micros(1);

/// Identifier of a stored bookmark.
///
/// New identifiers are random (version 4) UUIDs. Identifiers coming from a
/// request path must be in the hyphenated `8-4-4-4-12` hex form; any other
/// spelling accepted by [`Uuid::parse_str`] (braced, urn, simple) is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkId(Uuid);

impl BookmarkId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier supplied by a client.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        Self::validate(raw)?;
        Uuid::try_parse(raw)
            .map(Self)
            .map_err(|_| Self::invalid())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    fn validate(raw: &str) -> Result<(), FieldError> {
        if raw.len() != ID_LENGTH {
            return Err(Self::invalid());
        }

        let well_formed = raw.char_indices().all(|(i, c)| {
            if HYPHEN_POSITIONS.contains(&i) {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        });

        if !well_formed {
            return Err(Self::invalid());
        }

        Ok(())
    }

    /// Error reported for any identifier that is not well formed.
    pub fn invalid() -> FieldError {
        FieldError::new(ErrorCode::InvalidGuid, "Id is invalid parameter")
    }
}

impl Default for BookmarkId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for BookmarkId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl Display for BookmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A stored bookmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: BookmarkId,
    pub link: String,
    pub description: String,
    pub favorites: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Bookmark {
    /// Builds the record for a freshly validated bookmark.
    ///
    /// Both timestamps are set to `now`.
    pub fn create(id: BookmarkId, new: NewBookmark, now: Timestamp) -> Self {
        Self {
            id,
            link: new.link,
            description: new.description,
            favorites: new.favorites,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the supplied fields of `patch` and refreshes `updated_at`.
    ///
    /// `updated_at` never stays put: when `now` is not past the stored value
    /// it is advanced by [`UPDATE_RESOLUTION`] instead.
    pub fn apply(&mut self, patch: BookmarkPatch, now: Timestamp) {
        if let Some(link) = patch.link {
            self.link = link;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(favorites) = patch.favorites {
            self.favorites = favorites;
        }
        self.updated_at = next_update_time(self.updated_at, now);
    }
}

/// Returns the `updated_at` to store for an update happening at `now`.
pub fn next_update_time(previous: Timestamp, now: Timestamp) -> Timestamp {
    if now > previous {
        return now;
    }
    previous.checked_add(UPDATE_RESOLUTION).unwrap_or(now)
}

/// Validated input of the create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub link: String,
    pub description: String,
    pub favorites: bool,
}

/// Validated input of the partial update operation. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkPatch {
    pub link: Option<String>,
    pub description: Option<String>,
    pub favorites: Option<bool>,
}
