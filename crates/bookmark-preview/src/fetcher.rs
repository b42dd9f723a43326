use crate::config::{PreviewConfig, URL_PLACEHOLDER};
use bookmark_core::{FetchTarget, PreviewError};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Issues the outbound requests of a preview.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    whois_url_template: String,
}

impl Fetcher {
    /// Builds the HTTP client; fails when the WHOIS template lacks `{url}`.
    pub fn new(config: &PreviewConfig) -> Result<Self, PreviewError> {
        if !config.whois_url_template.contains(URL_PLACEHOLDER) {
            return Err(PreviewError::Client(format!(
                "whois url template '{}' has no {URL_PLACEHOLDER} placeholder",
                config.whois_url_template
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| PreviewError::Client(e.to_string()))?;

        Ok(Self::with_client(client, config.whois_url_template.clone()))
    }

    pub fn with_client(client: Client, whois_url_template: impl Into<String>) -> Self {
        Self {
            client,
            whois_url_template: whois_url_template.into(),
        }
    }

    /// WHOIS lookup address for `link`.
    pub fn whois_url(&self, link: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(link.as_bytes()).collect();
        self.whois_url_template.replace(URL_PLACEHOLDER, &encoded)
    }

    /// Downloads the page behind `link` as text.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch_page(&self, link: &str) -> Result<String, PreviewError> {
        self.get(FetchTarget::Page, link).await
    }

    /// Looks up the WHOIS report of `link`.
    ///
    /// A body that is not JSON is returned as a JSON string.
    #[instrument(level = "debug", skip(self), err)]
    pub async fn fetch_whois(&self, link: &str) -> Result<Value, PreviewError> {
        let body = self.get(FetchTarget::Whois, &self.whois_url(link)).await?;

        match serde_json::from_str(&body) {
            Ok(report) => Ok(report),
            Err(e) => {
                debug!(error = %e, "whois response is not json, passing it through as text");
                Ok(Value::String(body))
            }
        }
    }

    async fn get(&self, target: FetchTarget, raw: &str) -> Result<String, PreviewError> {
        let url = Url::parse(raw).map_err(|e| PreviewError::InvalidUrl {
            target,
            message: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(target, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%target, %status, "upstream returned an error status");
            return Err(PreviewError::Status {
                target,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                PreviewError::Timeout { target }
            } else {
                PreviewError::Body {
                    target,
                    message: e.to_string(),
                }
            }
        })
    }
}

fn request_error(target: FetchTarget, err: reqwest::Error) -> PreviewError {
    if err.is_timeout() {
        PreviewError::Timeout { target }
    } else {
        PreviewError::Request {
            target,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::time::Duration;

    async fn serve() -> SocketAddr {
        let app = Router::new()
            .route("/page", get(|| async { "<title>Hello</title>" }))
            .route(
                "/whois",
                get(|Query(query): Query<HashMap<String, String>>| async move {
                    Json(serde_json::json!({ "domainName": query.get("domain") }))
                }),
            )
            .route("/plain", get(|| async { "not json" }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn fetcher(whois_url_template: String) -> Fetcher {
        Fetcher::new(
            &PreviewConfig::builder()
                .timeout(Duration::from_millis(500))
                .whois_url_template(whois_url_template)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn whois_url_encodes_the_link() {
        let fetcher = fetcher("https://whois.test/lookup?domain={url}&format=json".to_string());
        assert_eq!(
            fetcher.whois_url("https://example.com/a b?x=1"),
            "https://whois.test/lookup?domain=https%3A%2F%2Fexample.com%2Fa+b%3Fx%3D1&format=json"
        );
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        let config = PreviewConfig::builder()
            .whois_url_template("https://whois.test/lookup?domain=example.com")
            .build();

        let err = Fetcher::new(&config).unwrap_err();
        assert!(matches!(err, PreviewError::Client(_)));
    }

    #[tokio::test]
    async fn fetches_page_text() {
        let addr = serve().await;
        let fetcher = fetcher(format!("http://{addr}/whois?domain={{url}}"));

        let page = fetcher.fetch_page(&format!("http://{addr}/page")).await.unwrap();
        assert_eq!(page, "<title>Hello</title>");
    }

    #[tokio::test]
    async fn whois_json_is_returned_as_is() {
        let addr = serve().await;
        let fetcher = fetcher(format!("http://{addr}/whois?domain={{url}}"));

        let report = fetcher.fetch_whois("https://example.com").await.unwrap();
        assert_eq!(report, serde_json::json!({ "domainName": "https://example.com" }));
    }

    #[tokio::test]
    async fn whois_text_is_wrapped_in_a_json_string() {
        let addr = serve().await;
        let fetcher = fetcher(format!("http://{addr}/plain?domain={{url}}"));

        let report = fetcher.fetch_whois("https://example.com").await.unwrap();
        assert_eq!(report, Value::String("not json".to_string()));
    }

    #[tokio::test]
    async fn error_status_is_a_failure() {
        let addr = serve().await;
        let fetcher = fetcher(format!("http://{addr}/missing?domain={{url}}"));

        let err = fetcher
            .fetch_page(&format!("http://{addr}/missing"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PreviewError::Status {
                target: FetchTarget::Page,
                status: 404
            }
        ));

        let err = fetcher.fetch_whois("https://example.com").await.unwrap_err();
        assert!(matches!(
            err,
            PreviewError::Status {
                target: FetchTarget::Whois,
                status: 404
            }
        ));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let addr = serve().await;
        let fetcher = fetcher(format!("http://{addr}/whois?domain={{url}}"));

        let err = fetcher
            .fetch_page(&format!("http://{addr}/slow"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PreviewError::Timeout {
                target: FetchTarget::Page
            }
        ));
    }

    #[tokio::test]
    async fn unparsable_link_is_rejected_before_sending() {
        let fetcher = fetcher("http://127.0.0.1:9/whois?domain={url}".to_string());
        let err = fetcher.fetch_page("not a url").await.unwrap_err();
        assert!(matches!(
            err,
            PreviewError::InvalidUrl {
                target: FetchTarget::Page,
                ..
            }
        ));
    }
}
