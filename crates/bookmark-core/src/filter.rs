//! Listing filter builder.
//!
//! Turns the raw, string-typed query parameters of the listing endpoint into a
//! [`ListQuery`]: an optional predicate, a sort order and a page window.
//! Store implementations execute a `ListQuery` either natively (SQL) or with
//! [`ListQuery::matches`] and [`Sort::compare`].

use crate::bookmark::Bookmark;
use crate::error::{ErrorCode, FieldError, ValidationErrors};
use jiff::civil::{Date, DateTime};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_LIMIT: u32 = 50;
pub const DEFAULT_OFFSET: u32 = 0;

/// Raw query parameters of `GET /bookmarks`.
///
/// Empty values are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub filter: Option<String>,
    pub filter_value: Option<String>,
    pub filter_from: Option<String>,
    pub filter_to: Option<String>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

/// Fields a listing can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    CreatedAt,
    Favorites,
}

impl FilterField {
    pub const ALL: [FilterField; 2] = [FilterField::CreatedAt, FilterField::Favorites];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::CreatedAt => "createdAt",
            FilterField::Favorites => "favorites",
        }
    }
}

impl FromStr for FilterField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| not_one_of("filter", s, &Self::ALL.map(|f| f.as_str())))
    }
}

/// Fields a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Favorites,
    Link,
}

impl SortField {
    pub const ALL: [SortField; 4] = [
        SortField::CreatedAt,
        SortField::UpdatedAt,
        SortField::Favorites,
        SortField::Link,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Favorites => "favorites",
            SortField::Link => "link",
        }
    }
}

impl FromStr for SortField {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| not_one_of("sort_by", s, &Self::ALL.map(|f| f.as_str())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(not_one_of("sort_dir", s, &["asc", "desc"])),
        }
    }
}

/// Ordering of a listing. Ties are broken by identifier so pages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn compare(&self, a: &Bookmark, b: &Bookmark) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Favorites => a.favorites.cmp(&b.favorites),
            SortField::Link => a.link.cmp(&b.link),
        };

        let ordering = match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };

        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

/// Window of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

/// Inclusive time interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: Timestamp,
    pub to: Timestamp,
}

impl TimeRange {
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.from <= ts && ts <= self.to
    }
}

/// Typed filter on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// `favorites = value`
    Favorites(bool),
    /// `createdAt = equals OR createdAt BETWEEN range`, at least one side set.
    CreatedAt {
        equals: Option<Timestamp>,
        range: Option<TimeRange>,
    },
}

impl Predicate {
    /// Builds a `createdAt` predicate, or `None` when neither side is usable.
    pub fn created_at(equals: Option<Timestamp>, range: Option<TimeRange>) -> Option<Self> {
        if equals.is_none() && range.is_none() {
            return None;
        }
        Some(Predicate::CreatedAt { equals, range })
    }

    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        match self {
            Predicate::Favorites(value) => bookmark.favorites == *value,
            Predicate::CreatedAt { equals, range } => {
                let exact = equals.is_some_and(|ts| bookmark.created_at == ts);
                let within = range.is_some_and(|r| r.contains(bookmark.created_at));
                exact || within
            }
        }
    }
}

/// Validated listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub predicate: Option<Predicate>,
    pub sort: Sort,
    pub pagination: Pagination,
}

impl ListQuery {
    pub fn matches(&self, bookmark: &Bookmark) -> bool {
        self.predicate.map_or(true, |p| p.matches(bookmark))
    }
}

impl ListParams {
    /// Validates every parameter, collecting all problems before failing.
    pub fn validate(&self) -> Result<ListQuery, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let limit = parse_count(non_empty(&self.limit), "limit", DEFAULT_LIMIT, &mut errors);
        let offset = parse_count(non_empty(&self.offset), "offset", DEFAULT_OFFSET, &mut errors);

        let sort_field = non_empty(&self.sort_by)
            .map(str::parse::<SortField>)
            .transpose()
            .unwrap_or_else(|e| {
                errors.add("sort_by", e);
                None
            })
            .unwrap_or_default();
        let sort_direction = non_empty(&self.sort_dir)
            .map(str::parse::<SortDirection>)
            .transpose()
            .unwrap_or_else(|e| {
                errors.add("sort_dir", e);
                None
            })
            .unwrap_or_default();

        let predicate = match non_empty(&self.filter).map(str::parse::<FilterField>) {
            None => None,
            Some(Err(e)) => {
                errors.add("filter", e);
                None
            }
            Some(Ok(field)) => self.predicate(field, &mut errors),
        };

        errors.into_result(ListQuery {
            predicate,
            sort: Sort {
                field: sort_field,
                direction: sort_direction,
            },
            pagination: Pagination { limit, offset },
        })
    }

    fn predicate(&self, field: FilterField, errors: &mut ValidationErrors) -> Option<Predicate> {
        let value = non_empty(&self.filter_value);

        match field {
            FilterField::Favorites => match value {
                Some(value) => Some(Predicate::Favorites(value == "true")),
                None => {
                    errors.add(
                        "filter_value",
                        FieldError::new(ErrorCode::MissingParameter, "select a filter_value"),
                    );
                    None
                }
            },
            FilterField::CreatedAt => {
                let from = non_empty(&self.filter_from);
                let to = non_empty(&self.filter_to);

                if value.is_none() && (from.is_none() || to.is_none()) {
                    errors.add(
                        "filter_value",
                        FieldError::new(
                            ErrorCode::MissingParameter,
                            "select a filter_value or both filter_from and filter_to",
                        ),
                    );
                    return None;
                }

                let equals = parse_time(value, "filter_value", errors);
                let from = parse_time(from, "filter_from", errors);
                let to = parse_time(to, "filter_to", errors);
                let range = from.zip(to).map(|(from, to)| TimeRange { from, to });

                Predicate::created_at(equals, range)
            }
        }
    }
}

/// Parses a client supplied date-time.
///
/// Accepts an RFC 3339 timestamp; a civil date-time or a bare date without an
/// offset is read as UTC.
pub fn parse_date_time(raw: &str) -> Option<Timestamp> {
    if let Ok(ts) = raw.parse::<Timestamp>() {
        return Some(ts);
    }
    if let Ok(dt) = raw.parse::<DateTime>() {
        return dt.to_zoned(TimeZone::UTC).ok().map(|z| z.timestamp());
    }
    raw.parse::<Date>()
        .ok()
        .and_then(|d| d.to_zoned(TimeZone::UTC).ok())
        .map(|z| z.timestamp())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_count(
    raw: Option<&str>,
    field: &str,
    default: u32,
    errors: &mut ValidationErrors,
) -> u32 {
    let Some(raw) = raw else {
        return default;
    };

    raw.parse::<u32>().unwrap_or_else(|_| {
        errors.add(
            field,
            FieldError::new(
                ErrorCode::InvalidParameter,
                format!("{field} must be a non-negative integer, got '{raw}'"),
            ),
        );
        default
    })
}

fn parse_time(
    raw: Option<&str>,
    field: &str,
    errors: &mut ValidationErrors,
) -> Option<Timestamp> {
    let raw = raw?;
    let parsed = parse_date_time(raw);
    if parsed.is_none() {
        errors.add(
            field,
            FieldError::new(
                ErrorCode::InvalidParameter,
                format!("'{raw}' is not a valid date-time"),
            ),
        );
    }
    parsed
}

fn not_one_of(field: &str, value: impl Display, allowed: &[&str]) -> FieldError {
    FieldError::new(
        ErrorCode::InvalidParameter,
        format!(
            "{field} must be one of: {}, got '{value}'",
            allowed.join(", ")
        ),
    )
}
