mod cli;

use crate::cli::{StorageBackendArg, CLI};
use bookmark_core::{BookmarkService, LinkValidator};
use bookmark_gateway::{App, AppState};
use bookmark_manager::BookmarkManager;
use bookmark_preview::{LinkPreviewService, PreviewConfig};
use bookmark_storage::{InMemoryRepository, MySqlRepository};
use bookmark_telemetry::TelemetryConfig;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CLI::try_parse()?;

    let _telemetry = bookmark_telemetry::init(
        &TelemetryConfig::builder()
            .service_name("bookmarks-gateway")
            .format(config.log_format.into())
            .otlp_endpoint(config.otlp_endpoint.clone())
            .build(),
    )?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        blocked_domains = ?config.blocked_domains,
        fetch_timeout_secs = config.fetch_timeout_secs,
        "starting bookmarks gateway"
    );

    let links = LinkValidator::new(&config.blocked_domains);
    let previewer = LinkPreviewService::new(
        &PreviewConfig::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .whois_url_template(config.whois_url_template.clone())
            .build(),
    )?;

    let service: Arc<dyn BookmarkService> = match config.storage {
        StorageBackendArg::InMemory => Arc::new(BookmarkManager::new(
            InMemoryRepository::new(),
            previewer,
            links,
        )),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .ok_or("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn).await?;
            repository.migrate().await?;
            Arc::new(BookmarkManager::new(repository, previewer, links))
        }
    };

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(AppState::new(service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down gateway");
}
