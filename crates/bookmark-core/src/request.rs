//! Raw request bodies of the mutation endpoints and their validation.
//!
//! Fields are kept as raw JSON values so that a wrongly typed field is
//! reported as a field error instead of a deserialization failure.

use crate::bookmark::{BookmarkPatch, NewBookmark};
use crate::error::ValidationErrors;
use crate::validation::{optional_flag, optional_text, required_text, LinkValidator, Presence};
use serde::Deserialize;
use serde_json::Value;

/// Body of `POST /bookmarks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateBookmarkRequest {
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub favorites: Option<Value>,
}

impl CreateBookmarkRequest {
    /// Checks every field and reports all problems at once.
    pub fn validate(&self, links: &LinkValidator) -> Result<NewBookmark, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let link = links
            .validate(self.link.as_ref(), Presence::Required)
            .map_err(|e| errors.add("link", e))
            .ok()
            .flatten();
        let description = required_text(self.description.as_ref(), "description")
            .map_err(|e| errors.add("description", e))
            .ok();
        let favorites = optional_flag(self.favorites.as_ref(), "favorites")
            .map_err(|e| errors.add("favorites", e))
            .ok()
            .flatten();

        match (link, description) {
            (Some(link), Some(description)) if errors.is_empty() => Ok(NewBookmark {
                link,
                description,
                favorites: favorites.unwrap_or(false),
            }),
            _ => Err(errors),
        }
    }
}

/// Body of `PATCH /bookmarks/{id}`. Absent and `null` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchBookmarkRequest {
    #[serde(default)]
    pub link: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub favorites: Option<Value>,
}

impl PatchBookmarkRequest {
    pub fn validate(&self, links: &LinkValidator) -> Result<BookmarkPatch, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let link = links
            .validate(self.link.as_ref(), Presence::Optional)
            .map_err(|e| errors.add("link", e))
            .ok()
            .flatten();
        let description = optional_text(self.description.as_ref(), "description")
            .map_err(|e| errors.add("description", e))
            .ok()
            .flatten();
        let favorites = optional_flag(self.favorites.as_ref(), "favorites")
            .map_err(|e| errors.add("favorites", e))
            .ok()
            .flatten();

        errors.into_result(BookmarkPatch {
            link,
            description,
            favorites,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn create(body: Value) -> CreateBookmarkRequest {
        serde_json::from_value(body).unwrap()
    }

    fn patch(body: Value) -> PatchBookmarkRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn create_accepts_complete_payload() {
        let request = create(json!({
            "link": "https://example.com",
            "description": "an example",
            "favorites": true,
        }));

        let new = request.validate(&LinkValidator::default()).unwrap();
        assert_eq!(new.link, "https://example.com");
        assert_eq!(new.description, "an example");
        assert!(new.favorites);
    }

    #[test]
    fn create_defaults_favorites_to_false() {
        let request = create(json!({
            "link": "https://example.com",
            "description": "an example",
        }));

        let new = request.validate(&LinkValidator::default()).unwrap();
        assert!(!new.favorites);
    }

    #[test]
    fn create_reports_every_bad_field() {
        let request = create(json!({
            "link": "https://yahoo.com",
            "description": 12,
            "favorites": "yes",
        }));

        let errors = request.validate(&LinkValidator::default()).unwrap_err();
        assert_eq!(
            errors.field("link").unwrap()[0].code,
            ErrorCode::BlockedDomain
        );
        assert_eq!(
            errors.field("description").unwrap()[0].code,
            ErrorCode::InvalidType
        );
        assert_eq!(
            errors.field("favorites").unwrap()[0].code,
            ErrorCode::InvalidType
        );
    }

    #[test]
    fn create_requires_link_and_description() {
        let errors = CreateBookmarkRequest::default()
            .validate(&LinkValidator::default())
            .unwrap_err();
        assert!(errors.field("link").is_some());
        assert!(errors.field("description").is_some());
        assert!(errors.field("favorites").is_none());
    }

    #[test]
    fn create_rejects_unknown_fields() {
        let result: Result<CreateBookmarkRequest, _> = serde_json::from_value(json!({
            "link": "https://example.com",
            "description": "x",
            "id": "0f8fad5b-d9cb-469f-a165-70867728950e",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn patch_treats_missing_and_null_as_unchanged() {
        let request = patch(json!({ "description": null }));
        let update = request.validate(&LinkValidator::default()).unwrap();
        assert_eq!(update, BookmarkPatch::default());
    }

    #[test]
    fn patch_revalidates_supplied_link() {
        let request = patch(json!({ "link": "definitely not a link" }));
        let errors = request.validate(&LinkValidator::default()).unwrap_err();
        assert_eq!(errors.field("link").unwrap()[0].code, ErrorCode::InvalidLink);

        let request = patch(json!({ "link": "https://socket.io/docs" }));
        let errors = request.validate(&LinkValidator::default()).unwrap_err();
        assert_eq!(
            errors.field("link").unwrap()[0].code,
            ErrorCode::BlockedDomain
        );
    }

    #[test]
    fn patch_rejects_wrong_types() {
        let request = patch(json!({ "description": false, "favorites": "true" }));
        let errors = request.validate(&LinkValidator::default()).unwrap_err();
        assert!(errors.field("description").is_some());
        assert!(errors.field("favorites").is_some());
    }

    #[test]
    fn patch_keeps_supplied_fields() {
        let request = patch(json!({ "favorites": true, "link": "https://rust-lang.org" }));
        let update = request.validate(&LinkValidator::default()).unwrap();
        assert_eq!(update.link.as_deref(), Some("https://rust-lang.org"));
        assert_eq!(update.favorites, Some(true));
        assert_eq!(update.description, None);
    }
}
