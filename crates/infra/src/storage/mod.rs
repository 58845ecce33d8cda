//! Storage boundary.
//!
//! Repositories talk to storage through a single operation: run a
//! parameterized statement, get rows back. Parameters are positional and
//! 1-indexed (`$1` binds `params[0]`); query text never contains caller values.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use hireboard_core::{SqlValue, StorageError};

pub mod postgres;
pub mod scripted;

pub use postgres::PgStorage;
pub use scripted::{RecordedCall, ScriptedStorage};

/// One result row, keyed by column name (or alias).
pub type Row = serde_json::Map<String, JsonValue>;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Execute `sql` with `params` bound positionally and return all rows.
    ///
    /// Statements without a `RETURNING`/result set return an empty vector.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError>;
}

#[async_trait::async_trait]
impl<S> Storage for Arc<S>
where
    S: Storage + ?Sized,
{
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        (**self).execute(sql, params).await
    }
}

/// Decode a row into a typed record.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StorageError> {
    serde_json::from_value(JsonValue::Object(row))
        .map_err(|e| StorageError::Decode(format!("failed to deserialize row: {e}")))
}
