use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("bookmarks/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_WHOIS_URL_TEMPLATE: &str =
    "https://www.whoisxmlapi.com/whoisserver/WhoisService?outputFormat=JSON&domainName={url}";

/// Placeholder in [`PreviewConfig::whois_url_template`] replaced by the
/// percent-encoded link.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Settings of the outbound preview requests.
#[derive(Debug, Clone, TypedBuilder)]
pub struct PreviewConfig {
    /// Upper bound for each outbound request, body included.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
    #[builder(default = DEFAULT_USER_AGENT.to_string(), setter(into))]
    pub user_agent: String,
    /// WHOIS endpoint; must contain `{url}`.
    #[builder(default = DEFAULT_WHOIS_URL_TEMPLATE.to_string(), setter(into))]
    pub whois_url_template: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
