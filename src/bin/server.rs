//! Table bridge server.
//!
//! Reads settings from the environment (and `.env`), builds the schema registry once,
//! then serves the bridge until Ctrl-C.

use std::sync::Arc;
use table_bridge::{
    app, introspect, load_from_path, resolve, AppState, PgExecutionClient, SchemaSource, Settings,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("table_bridge=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(&settings.database_url)
        .await?;

    let config = match &settings.schema_source {
        SchemaSource::Introspect => introspect(&pool, &settings.db_schema).await?,
        SchemaSource::File(path) => {
            tracing::info!(path = %path.display(), "loading declared schema");
            load_from_path(path).await?
        }
    };
    let registry = resolve(&config, &settings.db_schema)?;
    if registry.is_empty() {
        tracing::warn!(schema = %settings.db_schema, "schema registry is empty; every table route will answer 404");
    }
    tracing::info!(tables = registry.len(), "schema registry ready");

    let client = Arc::new(PgExecutionClient::new(pool.clone()));
    let state = AppState::new(registry, client).with_require_target(settings.require_target);
    let router = app(state, &settings);

    let listener = TcpListener::bind(settings.bind).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        prefix = %settings.api_prefix,
        "table bridge listening"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
