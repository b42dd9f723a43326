use bookmark_telemetry::LogFormat;
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "BOOKMARKS_GATEWAY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "BOOKMARKS_GATEWAY_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "BOOKMARKS_GATEWAY_MYSQL_DSN";
pub const BLOCKED_DOMAINS_ENV: &str = "BOOKMARKS_GATEWAY_BLOCKED_DOMAINS";
pub const WHOIS_URL_TEMPLATE_ENV: &str = "BOOKMARKS_GATEWAY_WHOIS_URL_TEMPLATE";
pub const FETCH_TIMEOUT_SECS_ENV: &str = "BOOKMARKS_GATEWAY_FETCH_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "BOOKMARKS_GATEWAY_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "BOOKMARKS_GATEWAY_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BLOCKED_DOMAINS: &str = "yahoo.com,socket.io";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "bookmarks-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Hostnames rejected as bookmark links, comma separated.
    #[arg(
        long,
        env = BLOCKED_DOMAINS_ENV,
        value_delimiter = ',',
        default_value = DEFAULT_BLOCKED_DOMAINS
    )]
    pub blocked_domains: Vec<String>,

    /// WHOIS endpoint, `{url}` is replaced by the percent-encoded link.
    #[arg(
        long,
        env = WHOIS_URL_TEMPLATE_ENV,
        default_value = bookmark_preview::config::DEFAULT_WHOIS_URL_TEMPLATE
    )]
    pub whois_url_template: String,

    #[arg(long, env = FETCH_TIMEOUT_SECS_ENV, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS)]
    pub fetch_timeout_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
