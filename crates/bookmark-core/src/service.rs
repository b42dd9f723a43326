use crate::error::ServiceError;
use crate::filter::ListParams;
use crate::preview::Preview;
use crate::repository::ListPage;
use crate::request::{CreateBookmarkRequest, PatchBookmarkRequest};
use crate::BookmarkId;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

type Result<T> = std::result::Result<T, ServiceError>;

/// Returned by a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookmark {
    pub id: BookmarkId,
    pub created_at: Timestamp,
}

/// The bookmarks use cases.
///
/// Every method validates its raw input first; no store access happens once
/// validation has failed. Identifiers arrive as the raw path segment.
#[async_trait]
pub trait BookmarkService: Send + Sync + 'static {
    /// Lists bookmarks matching the filter in `params`.
    async fn list(&self, params: ListParams) -> Result<ListPage>;

    /// Creates a bookmark and returns its identifier and creation time.
    async fn create(&self, request: CreateBookmarkRequest) -> Result<CreatedBookmark>;

    /// Applies the supplied fields to the bookmark `id`.
    async fn patch(&self, id: &str, request: PatchBookmarkRequest) -> Result<()>;

    /// Removes the bookmark `id`.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Generates a preview of the link stored under `id`.
    async fn preview(&self, id: &str) -> Result<Preview>;
}
