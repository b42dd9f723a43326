//! Core types and traits for the bookmarks service.
//!
//! This crate holds the domain model, the boundary validation of raw
//! requests, the listing filter builder and the traits implemented by the
//! storage, preview and service crates.

pub mod bookmark;
pub mod clock;
pub mod error;
pub mod filter;
pub mod preview;
pub mod repository;
pub mod request;
pub mod service;
pub mod validation;

pub use bookmark::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark};
pub use clock::{Clock, SystemClock};
pub use error::{
    ErrorCode, FetchTarget, FieldError, PreviewError, ServiceError, StorageError,
    ValidationErrors,
};
pub use filter::{ListParams, ListQuery, Predicate, SortDirection, SortField};
pub use preview::{LinkPreviewer, OpenGraph, Preview};
pub use repository::{ListPage, ReadRepository, Repository};
pub use request::{CreateBookmarkRequest, PatchBookmarkRequest};
pub use service::{BookmarkService, CreatedBookmark};
pub use validation::LinkValidator;
