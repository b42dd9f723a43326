//! Disposable MySQL server for integration tests.

use crate::Result;
use std::fmt::Display;
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::ImageExt;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const MYSQL_PORT: u16 = 3306;
const ROOT_PASSWORD: &str = "root";
// The entrypoint first runs a bootstrap server without networking; only the
// final server reports the TCP port. The X plugin line mentions port 33060.
const READY_MESSAGE: &str = "port: 3306  MySQL Community Server";

/// Database, account and image tag of the container.
#[derive(Debug, Clone, TypedBuilder)]
pub struct MysqlConfig {
    #[builder(default = "bookmarks".to_string(), setter(into))]
    database: String,
    #[builder(default = "bookmarks".to_string(), setter(into))]
    username: String,
    #[builder(default = "bookmarks".to_string(), setter(into))]
    password: String,
    #[builder(default = "8.4".to_string(), setter(into))]
    tag: String,
}

impl MysqlConfig {
    fn url(&self, host: impl Display, port: u16) -> String {
        format!(
            "mysql://{}:{}@{host}:{port}/{}",
            self.username, self.password, self.database
        )
    }
}

pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
    config: MysqlConfig,
}

impl MySqlServer {
    /// Starts the container and waits until the server accepts TCP clients.
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        let container = GenericImage::new("mysql", config.tag.as_str())
            .with_exposed_port(MYSQL_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr(READY_MESSAGE))
            .with_env_var("MYSQL_ROOT_PASSWORD", ROOT_PASSWORD)
            .with_env_var("MYSQL_DATABASE", config.database.as_str())
            .with_env_var("MYSQL_USER", config.username.as_str())
            .with_env_var("MYSQL_PASSWORD", config.password.as_str())
            .start()
            .await?;

        Ok(Self { container, config })
    }

    /// sqlx connection string of the mapped host port.
    pub async fn database_url(&self) -> Result<String> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(MYSQL_PORT).await?;
        Ok(self.config.url(host, port))
    }
}
