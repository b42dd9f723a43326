use crate::error::PreviewError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// `og:type` of every generated preview.
pub const OG_TYPE_WEBSITE: &str = "website";

/// Open Graph style summary of a linked page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGraph {
    #[serde(rename = "og:type")]
    pub kind: String,
    #[serde(rename = "og:title")]
    pub title: String,
    #[serde(rename = "og:image")]
    pub image: String,
    #[serde(rename = "og:description")]
    pub description: String,
}

/// A generated preview. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub preview: OpenGraph,
    /// WHOIS report exactly as returned by the lookup service.
    pub whois: Value,
}

/// Builds previews for links.
#[async_trait]
pub trait LinkPreviewer: Send + Sync + 'static {
    /// Fetches `link` and its WHOIS report and assembles a preview.
    /// `description` is copied into the preview as is.
    async fn preview(&self, link: &str, description: &str) -> Result<Preview, PreviewError>;
}
