//! Schema bootstrap.
//!
//! The script is idempotent (`CREATE TABLE IF NOT EXISTS`), so it is safe to
//! run on every start.

use sqlx::PgPool;
use tracing::instrument;

use hireboard_core::StorageError;

pub const INIT_SQL: &str = include_str!("../migrations/0001_init.sql");

#[instrument(skip(pool), err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(INIT_SQL)
        .execute(pool)
        .await
        .map_err(|e| StorageError::Database(format!("schema bootstrap failed: {e}")))?;
    tracing::info!("schema ready");
    Ok(())
}
