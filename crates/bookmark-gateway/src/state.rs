use std::sync::Arc;

use bookmark_core::BookmarkService;

#[derive(Clone)]
pub struct AppState {
    bookmarks: Arc<dyn BookmarkService>,
}

impl AppState {
    pub fn new(bookmarks: Arc<dyn BookmarkService>) -> Self {
        Self { bookmarks }
    }

    pub fn bookmarks(&self) -> &dyn BookmarkService {
        self.bookmarks.as_ref()
    }
}
