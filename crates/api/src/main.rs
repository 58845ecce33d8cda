use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use hireboard_api::config::ApiConfig;
use hireboard_infra::{schema, PgStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hireboard_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "starting");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    schema::ensure_schema(&pool).await?;

    let storage = Arc::new(PgStorage::new(pool));
    let app = hireboard_api::app::build_app(storage, config.jwt_secret.as_bytes());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
