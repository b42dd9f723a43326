use crate::bookmark::{Bookmark, BookmarkId, BookmarkPatch};
use crate::error::StorageError;
use crate::filter::ListQuery;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::Serialize;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// One page of a listing together with the number of all matching records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPage {
    /// Total number of records matching the predicate, ignoring the page window.
    #[serde(rename = "length")]
    pub total: u64,
    #[serde(rename = "data")]
    pub items: Vec<Bookmark>,
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the bookmark with the given identifier.
    /// Returns `None` if it does not exist.
    async fn get(&self, id: &BookmarkId) -> Result<Option<Bookmark>>;

    /// Returns the page of bookmarks selected by `query` and the count of
    /// all matches.
    async fn list(&self, query: &ListQuery) -> Result<ListPage>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new bookmark. Returns `Err(Conflict)` if the identifier is taken.
    async fn insert(&self, bookmark: Bookmark) -> Result<()>;

    /// Applies `patch` to a single bookmark and sets its `updated_at`.
    ///
    /// `updated_at` is raised past the stored value when the clock has not
    /// moved, so it strictly increases on every update.
    /// Returns `false` if no bookmark has the identifier.
    async fn update(
        &self,
        id: &BookmarkId,
        patch: BookmarkPatch,
        updated_at: Timestamp,
    ) -> Result<bool>;

    /// Deletes the bookmark with the given identifier.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, id: &BookmarkId) -> Result<bool>;
}
