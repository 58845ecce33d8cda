use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use hireboard_core::{
    FieldMapping, NewPosting, PartialUpdate, Posting, PostingFilter, PostingId, QueryFragment,
    RepoError, RepoResult, SqlValue, StorageError, WhereClause, sql_for_partial_update,
};

use super::{all, check_update_fields, first, inserted, select_sql};
use crate::storage::Storage;

const ENTITY: &str = "posting";

const UPDATABLE: &[&str] = &["title", "salary", "equity"];
const IMMUTABLE: &[&str] = &["id", "organizationHandle"];

/// Posting projection shared with the organization detail query.
pub(super) const POSTING_COLUMNS: &str = r#"id,
       title,
       salary,
       equity::float8 AS equity,
       organization_handle AS "organizationHandle""#;

#[derive(Debug, Deserialize)]
struct ApplicationRow {
    posting_id: i64,
}

/// Postings, keyed by their generated integer id.
///
/// Keys arrive as text; a key that does not parse is rejected with
/// `InvalidKey` before any storage access.
#[derive(Clone)]
pub struct PostingRepository {
    storage: Arc<dyn Storage>,
}

impl PostingRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create a posting under an existing organization.
    #[instrument(skip(self, new), fields(organization = %new.organization_handle))]
    pub async fn create(&self, new: &NewPosting) -> RepoResult<Posting> {
        let parent = self
            .storage
            .execute(
                "SELECT handle FROM organizations WHERE handle = $1",
                &[SqlValue::from(new.organization_handle.as_str())],
            )
            .await?;
        if parent.is_empty() {
            return Err(RepoError::missing_parent(
                "organization",
                &new.organization_handle,
            ));
        }

        let sql = format!(
            "INSERT INTO postings (title, salary, equity, organization_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {POSTING_COLUMNS}"
        );
        let params = [
            SqlValue::from(new.title.as_str()),
            SqlValue::from(new.salary),
            SqlValue::from(new.equity),
            SqlValue::from(new.organization_handle.as_str()),
        ];
        let rows = self
            .storage
            .execute(&sql, &params)
            .await
            .map_err(|e| match e {
                // The parent was removed between the check and the insert.
                StorageError::ForeignKeyViolation(_) => {
                    RepoError::missing_parent("organization", &new.organization_handle)
                }
                other => other.into(),
            })?;

        let posting: Posting = inserted(rows)?;
        tracing::info!(posting_id = %posting.id, "posting created");
        Ok(posting)
    }

    /// All postings ordered by id, optionally filtered.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: Option<&PostingFilter>) -> RepoResult<Vec<Posting>> {
        let fragment = match filter {
            Some(filter) => filter.to_where_clause()?,
            None => QueryFragment::default(),
        };
        let sql = select_sql(POSTING_COLUMNS, "postings", &fragment, "id");
        let rows = self.storage.execute(&sql, &fragment.params).await?;
        Ok(all(rows)?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> RepoResult<Posting> {
        let id: PostingId = key.parse()?;
        let sql = format!("SELECT {POSTING_COLUMNS} FROM postings WHERE id = $1");
        let rows = self
            .storage
            .execute(&sql, &[SqlValue::from(id.get())])
            .await?;
        first(rows)?.ok_or_else(|| RepoError::not_found(ENTITY, id.to_string()))
    }

    /// Apply a partial update (`title`, `salary`, `equity`).
    ///
    /// `id` and `organizationHandle` are fixed at creation time.
    #[instrument(skip(self, update), fields(fields = update.len()))]
    pub async fn update(&self, key: &str, update: &PartialUpdate) -> RepoResult<Posting> {
        let id: PostingId = key.parse()?;
        check_update_fields(update, UPDATABLE, IMMUTABLE)?;
        let set = sql_for_partial_update(update, &FieldMapping::IDENTITY)?;

        let sql = format!(
            "UPDATE postings
             SET {}
             WHERE id = ${}
             RETURNING {POSTING_COLUMNS}",
            set.clause,
            set.next_placeholder()
        );
        let mut params = set.params;
        params.push(SqlValue::from(id.get()));

        let rows = self.storage.execute(&sql, &params).await?;
        first(rows)?.ok_or_else(|| RepoError::not_found(ENTITY, id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, key: &str) -> RepoResult<()> {
        let id: PostingId = key.parse()?;
        let rows = self
            .storage
            .execute(
                "DELETE FROM postings WHERE id = $1 RETURNING id",
                &[SqlValue::from(id.get())],
            )
            .await?;
        if rows.is_empty() {
            return Err(RepoError::not_found(ENTITY, id.to_string()));
        }
        tracing::info!("posting removed");
        Ok(())
    }

    /// Record that `username` applied to the posting `key`.
    ///
    /// Applying twice is a `Duplicate`.
    #[instrument(skip(self))]
    pub async fn apply(&self, username: &str, key: &str) -> RepoResult<PostingId> {
        let id: PostingId = key.parse()?;

        let found = self
            .storage
            .execute("SELECT id FROM postings WHERE id = $1", &[SqlValue::from(id.get())])
            .await?;
        if found.is_empty() {
            return Err(RepoError::not_found(ENTITY, id.to_string()));
        }

        self.storage
            .execute(
                "INSERT INTO applications (username, posting_id) VALUES ($1, $2)",
                &[SqlValue::from(username), SqlValue::from(id.get())],
            )
            .await
            .map_err(|e| match e {
                StorageError::UniqueViolation(_) => {
                    RepoError::duplicate("application", format!("{username}/{id}"))
                }
                StorageError::ForeignKeyViolation(_) => RepoError::not_found(ENTITY, id.to_string()),
                other => other.into(),
            })?;

        tracing::info!("application recorded");
        Ok(id)
    }

    /// Ids of the postings `username` applied to, ascending.
    #[instrument(skip(self))]
    pub async fn applications(&self, username: &str) -> RepoResult<Vec<PostingId>> {
        let rows = self
            .storage
            .execute(
                "SELECT posting_id FROM applications WHERE username = $1 ORDER BY posting_id",
                &[SqlValue::from(username)],
            )
            .await?;
        let rows: Vec<ApplicationRow> = all(rows)?;
        Ok(rows.into_iter().map(|r| PostingId::new(r.posting_id)).collect())
    }
}
