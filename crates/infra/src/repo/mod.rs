//! Entity repositories.
//!
//! Each repository holds only a storage handle. Query text is assembled from
//! constants in these modules plus fragments from the `hireboard-core`
//! builders; caller values only ever travel as bound parameters.
//!
//! ## Create races
//!
//! The natural-key pre-check and the insert are separate statements. Two
//! concurrent creates with the same key can both pass the pre-check; the
//! storage-level unique constraint rejects the second insert, and that
//! violation is reported as `RepoError::Duplicate` as well.

use hireboard_core::{PartialUpdate, QueryFragment, RepoError, RepoResult, StorageError};
use serde::de::DeserializeOwned;

use crate::storage::{Row, from_row};

pub mod organizations;
pub mod postings;

pub use organizations::OrganizationRepository;
pub use postings::PostingRepository;

/// `SELECT ... [WHERE ...] ORDER BY ...`; the `WHERE` is omitted for an empty filter.
fn select_sql(columns: &str, table: &str, filter: &QueryFragment, order_by: &str) -> String {
    if filter.is_empty() {
        format!("SELECT {columns} FROM {table} ORDER BY {order_by}")
    } else {
        format!(
            "SELECT {columns} FROM {table} WHERE {} ORDER BY {order_by}",
            filter.clause
        )
    }
}

/// Reject fields a caller may not touch before any SQL is built.
fn check_update_fields(
    update: &PartialUpdate,
    updatable: &[&str],
    immutable: &[&str],
) -> RepoResult<()> {
    for field in update.field_names() {
        if immutable.contains(&field) {
            return Err(RepoError::ImmutableField(field.to_string()));
        }
        if !updatable.contains(&field) {
            return Err(RepoError::UnknownField(field.to_string()));
        }
    }
    Ok(())
}

fn first<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Option<T>, StorageError> {
    rows.into_iter().next().map(from_row).transpose()
}

fn all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StorageError> {
    rows.into_iter().map(from_row).collect()
}

/// The single row an `INSERT ... RETURNING` must produce.
fn inserted<T: DeserializeOwned>(rows: Vec<Row>) -> Result<T, StorageError> {
    first(rows)?.ok_or_else(|| StorageError::Decode("insert returned no row".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_omits_where() {
        let sql = select_sql("a", "t", &QueryFragment::default(), "a");
        assert_eq!(sql, "SELECT a FROM t ORDER BY a");
    }

    #[test]
    fn immutable_fields_win_over_unknown() {
        let update = PartialUpdate::new().set("handle", "x");
        let err = check_update_fields(&update, &["name"], &["handle"]).unwrap_err();
        assert_eq!(err, RepoError::ImmutableField("handle".to_string()));

        let update = PartialUpdate::new().set("color", "blue");
        let err = check_update_fields(&update, &["name"], &["handle"]).unwrap_err();
        assert_eq!(err, RepoError::UnknownField("color".to_string()));
    }
}
