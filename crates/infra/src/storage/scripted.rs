use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value as JsonValue;

use hireboard_core::{SqlValue, StorageError};

use super::{Row, Storage};

/// A statement as it reached storage.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// In-memory storage that replays queued replies and records every call.
///
/// Intended for tests/dev. Replies are consumed in FIFO order; when the
/// queue is empty, statements return no rows.
#[derive(Debug, Default)]
pub struct ScriptedStorage {
    replies: Mutex<VecDeque<Result<Vec<Row>, StorageError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Queue a reply carrying `rows` (each must be a JSON object).
    pub fn push_rows(&self, rows: impl IntoIterator<Item = JsonValue>) -> &Self {
        let rows = rows.into_iter().map(json_row).collect();
        self.push_reply(Ok(rows))
    }

    /// Queue a reply with no rows.
    pub fn push_empty(&self) -> &Self {
        self.push_reply(Ok(Vec::new()))
    }

    pub fn push_error(&self, err: StorageError) -> &Self {
        self.push_reply(Err(err))
    }

    fn push_reply(&self, reply: Result<Vec<Row>, StorageError>) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait::async_trait]
impl Storage for ScriptedStorage {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, StorageError> {
        self.calls
            .lock()
            .map_err(|_| StorageError::Database("lock poisoned".to_string()))?
            .push(RecordedCall {
                sql: sql.to_string(),
                params: params.to_vec(),
            });

        let reply = self
            .replies
            .lock()
            .map_err(|_| StorageError::Database("lock poisoned".to_string()))?
            .pop_front();
        reply.unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Turn a JSON object into a row. Non-objects become an empty row.
pub fn json_row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        _ => Row::new(),
    }
}
