use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use snafu::ResultExt as _;
use surrealdb::opt::auth;
use url::Url;

use crate::database::{self, Connection, Database, DatabaseConnectionSnafu};
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "Config::default_host")]
    pub host: SocketAddr,
    #[serde(rename = "log_dir", default = "Config::default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(flatten)]
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub counting: CountingConfig,
}

impl Config {
    pub fn from_env() -> Result<Config, ApplicationError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }

    pub async fn database(&self) -> database::Result<Database> {
        self.database.connect().await
    }

    fn default_host() -> SocketAddr {
        ([127, 0, 0, 1], 3000).into()
    }

    fn default_log_dir() -> PathBuf {
        PathBuf::from("logs")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "surreal_url", default = "DatabaseConfig::default_url")]
    pub url: Url,
    #[serde(rename = "surreal_ns", default = "DatabaseConfig::default_namespace")]
    pub namespace: String,
    #[serde(rename = "surreal_db", default = "DatabaseConfig::default_database")]
    pub database: String,
    #[serde(flatten)]
    pub credentials: Option<DatabaseCredentials>,
}

impl DatabaseConfig {
    fn default_url() -> Url {
        Url::parse("mem://").expect("the default store endpoint is a valid url")
    }

    fn default_namespace() -> String {
        "gazette".to_string()
    }

    fn default_database() -> String {
        "gazette".to_string()
    }
}

impl Connection for DatabaseConfig {
    type Database = Database;

    async fn connect(&self) -> database::Result<Database> {
        let connection = surrealdb::engine::any::connect(self.url.as_str())
            .await
            .context(DatabaseConnectionSnafu {
                url: self.url.clone(),
            })?;

        if let Some(credentials) = &self.credentials {
            connection
                .signin(credentials.auth(&self.namespace, &self.database))
                .await
                .context(DatabaseConnectionSnafu {
                    url: self.url.clone(),
                })?;
        }

        connection
            .use_ns(&self.namespace)
            .use_db(&self.database)
            .await
            .context(DatabaseConnectionSnafu {
                url: self.url.clone(),
            })?;

        Database::initialize(connection).await
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseCredentials {
    #[serde(rename = "surreal_user")]
    pub username: String,
    #[serde(rename = "surreal_pass")]
    pub password: String,
}

impl DatabaseCredentials {
    fn auth<'a>(
        &'a self,
        namespace: &'a str,
        database: &'a str,
    ) -> impl auth::Credentials<auth::Signin, auth::Jwt> + 'a {
        auth::Database {
            namespace,
            database,
            username: &self.username,
            password: &self.password,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CountingConfig {
    #[serde(
        rename = "view_throttle_secs",
        default = "CountingConfig::default_throttle_secs",
        deserialize_with = "from_text"
    )]
    pub throttle_secs: u64,
    #[serde(
        rename = "view_cache_high_water",
        default = "CountingConfig::default_high_water",
        deserialize_with = "from_text"
    )]
    pub high_water: usize,
}

impl CountingConfig {
    /// The throttle window as a duration.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.throttle_secs as i64)
    }

    fn default_throttle_secs() -> u64 {
        60
    }

    fn default_high_water() -> usize {
        1000
    }
}

/// Numeric fields sit inside flattened sections, so their values arrive as
/// text and need an explicit parse.
fn from_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}
