use crate::config::PreviewConfig;
use crate::extractor::extract;
use crate::fetcher::Fetcher;
use async_trait::async_trait;
use bookmark_core::preview::OG_TYPE_WEBSITE;
use bookmark_core::{LinkPreviewer, OpenGraph, Preview, PreviewError};
use tracing::{debug, instrument};

/// [`LinkPreviewer`] backed by live HTTP requests.
#[derive(Debug, Clone)]
pub struct LinkPreviewService {
    fetcher: Fetcher,
}

impl LinkPreviewService {
    pub fn new(config: &PreviewConfig) -> Result<Self, PreviewError> {
        Ok(Self::with_fetcher(Fetcher::new(config)?))
    }

    pub fn with_fetcher(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl LinkPreviewer for LinkPreviewService {
    #[instrument(level = "debug", skip(self, description), err)]
    async fn preview(&self, link: &str, description: &str) -> Result<Preview, PreviewError> {
        let (page, whois) = tokio::try_join!(
            self.fetcher.fetch_page(link),
            self.fetcher.fetch_whois(link)
        )?;

        let extracted = extract(&page);
        debug!(title = %extracted.title, image = %extracted.image, "extracted preview");

        Ok(Preview {
            preview: OpenGraph {
                kind: OG_TYPE_WEBSITE.to_string(),
                title: extracted.title,
                image: extracted.image,
                description: description.to_string(),
            },
            whois,
        })
    }
}
