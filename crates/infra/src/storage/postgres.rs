//! Postgres-backed storage.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StorageError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StorageError |
//! |------------|----------------------|--------------|
//! | Database (unique violation) | `23505` | `UniqueViolation` |
//! | Database (foreign key violation) | `23503` | `ForeignKeyViolation` |
//! | Database (check constraint violation) | `23514` | `CheckViolation` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / PoolTimedOut / Io / other | N/A | `Database` |
//!
//! ## Row Decoding
//!
//! Result columns are decoded by their Postgres type into JSON scalars
//! (`BOOL`, `INT2/4/8`, `FLOAT4/8`, `TEXT/VARCHAR/BPCHAR/NAME`). Anything else
//! must be cast in the query (e.g. `equity::float8`).

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo};
use tracing::instrument;

use hireboard_core::{SqlValue, StorageError};

use super::{Row, Storage};

/// Storage over a SQLx Postgres connection pool.
///
/// `Send + Sync`; the pool handles connection management.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: Arc<PgPool>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl Storage for PgStorage {
    #[instrument(skip(self, params), fields(param_count = params.len()), err)]
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_value(query, param);
        }

        let rows = query
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("execute", e))?;

        rows.iter().map(decode_row).collect()
    }
}

// NULL is sent as int8: Postgres assignment casts turn it into any of our
// column types (text, integer, numeric).
fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Null => query.bind(None::<i64>),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int(i) => query.bind(*i),
        SqlValue::Float(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.as_str()),
    }
}

fn decode_row(row: &PgRow) -> Result<Row, StorageError> {
    let mut out = Row::new();
    for column in row.columns() {
        let idx = column.ordinal();
        let value = match column.type_info().name() {
            "BOOL" => row.try_get::<Option<bool>, _>(idx).map(|v| v.map(JsonValue::from)),
            "INT2" => row.try_get::<Option<i16>, _>(idx).map(|v| v.map(JsonValue::from)),
            "INT4" => row.try_get::<Option<i32>, _>(idx).map(|v| v.map(JsonValue::from)),
            "INT8" => row.try_get::<Option<i64>, _>(idx).map(|v| v.map(JsonValue::from)),
            "FLOAT4" => row.try_get::<Option<f32>, _>(idx).map(|v| v.map(JsonValue::from)),
            "FLOAT8" => row.try_get::<Option<f64>, _>(idx).map(|v| v.map(JsonValue::from)),
            "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
                row.try_get::<Option<String>, _>(idx).map(|v| v.map(JsonValue::from))
            }
            other => {
                return Err(StorageError::Decode(format!(
                    "unsupported column type {other} for '{}'",
                    column.name()
                )));
            }
        }
        .map_err(|e| StorageError::Decode(format!("column '{}': {e}", column.name())))?;

        out.insert(column.name().to_string(), value.unwrap_or(JsonValue::Null));
    }
    Ok(out)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StorageError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StorageError::UniqueViolation(msg),
                Some("23503") => StorageError::ForeignKeyViolation(msg),
                Some("23514") => StorageError::CheckViolation(msg),
                _ => StorageError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StorageError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StorageError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
