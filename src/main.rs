use dotenvy::dotenv;
use snafu::ResultExt as _;

use gazette::api::{create_app, create_router};
use gazette::config::Config;
use gazette::error::{ApplicationError, BindAddressSnafu, ConnectDatabaseSnafu, WebServerSnafu};
use gazette::logging;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    dotenv().ok();

    let config = Config::from_env()?;

    let _guard = logging::init(&config)?;

    let database = config.database().await.context(ConnectDatabaseSnafu)?;
    let app = create_app(&config, database);
    let router = create_router(app);

    let listener = tokio::net::TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu {
            address: config.host,
        })?;

    tracing::info!(address = %config.host, "serving the gazette api");
    axum::serve(listener, router).await.context(WebServerSnafu)
}
