use async_trait::async_trait;
use bookmark_core::repository::{ListPage, ReadRepository, Repository, Result};
use bookmark_core::{Bookmark, BookmarkId, BookmarkPatch, ListQuery, StorageError};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Listings scan every entry.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: DashMap<BookmarkId, Bookmark>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: &BookmarkId) -> Result<Option<Bookmark>> {
        Ok(self.storage.get(id).map(|entry| entry.value().clone()))
    }

    async fn list(&self, query: &ListQuery) -> Result<ListPage> {
        let mut matching: Vec<Bookmark> = self
            .storage
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        matching.sort_by(|a, b| query.sort.compare(a, b));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.pagination.offset as usize)
            .take(query.pagination.limit as usize)
            .collect();

        Ok(ListPage { total, items })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, bookmark: Bookmark) -> Result<()> {
        match self.storage.entry(bookmark.id) {
            Entry::Occupied(_) => Err(StorageError::Conflict(bookmark.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(bookmark);
                Ok(())
            }
        }
    }

    async fn update(
        &self,
        id: &BookmarkId,
        patch: BookmarkPatch,
        updated_at: Timestamp,
    ) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(id) else {
            return Ok(false);
        };

        entry.apply(patch, updated_at);
        Ok(true)
    }

    async fn delete(&self, id: &BookmarkId) -> Result<bool> {
        Ok(self.storage.remove(id).is_some())
    }
}
