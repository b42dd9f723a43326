//! Link previews: fetches a page and its WHOIS report concurrently and
//! extracts a title and image from the page markup.

pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod service;

pub use bookmark_core::{LinkPreviewer, OpenGraph, Preview, PreviewError};
pub use config::PreviewConfig;
pub use extractor::{extract, Extracted};
pub use fetcher::Fetcher;
pub use service::LinkPreviewService;
