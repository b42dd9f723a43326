mod bookmark;
mod health;

pub use bookmark::{
    create_bookmark_handler, delete_bookmark_handler, list_bookmarks_handler,
    patch_bookmark_handler, preview_bookmark_handler,
};
pub use health::health_handler;
