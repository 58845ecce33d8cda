use std::sync::Arc;

use tracing::instrument;

use hireboard_core::{
    FieldMapping, NewOrganization, Organization, OrganizationDetail, OrganizationFilter,
    PartialUpdate, Posting, QueryFragment, RepoError, RepoResult, SqlValue, StorageError,
    WhereClause, sql_for_partial_update,
};

use super::postings::POSTING_COLUMNS;
use super::{all, check_update_fields, first, inserted, select_sql};
use crate::storage::Storage;

const ENTITY: &str = "organization";

const FIELDS: FieldMapping =
    FieldMapping::new(&[("numEmployees", "num_employees"), ("logoUrl", "logo_url")]);

// Unique constraint on `organizations.name`; see migrations/0001_init.sql.
const NAME_CONSTRAINT: &str = "organizations_name_key";

const UPDATABLE: &[&str] = &["name", "description", "numEmployees", "logoUrl"];
const IMMUTABLE: &[&str] = &["handle"];

const COLUMNS: &str = r#"handle,
       name,
       description,
       num_employees AS "numEmployees",
       logo_url AS "logoUrl""#;

/// Organizations, keyed by their caller-assigned `handle`.
#[derive(Clone)]
pub struct OrganizationRepository {
    storage: Arc<dyn Storage>,
}

impl OrganizationRepository {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Create an organization.
    ///
    /// Fails with `Duplicate` if the handle (or, via the storage constraint,
    /// the name) is taken.
    #[instrument(skip(self, new), fields(handle = %new.handle))]
    pub async fn create(&self, new: &NewOrganization) -> RepoResult<Organization> {
        let existing = self
            .storage
            .execute(
                "SELECT handle FROM organizations WHERE handle = $1",
                &[SqlValue::from(new.handle.as_str())],
            )
            .await?;
        if !existing.is_empty() {
            return Err(RepoError::duplicate(ENTITY, &new.handle));
        }

        let sql = format!(
            "INSERT INTO organizations (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let params = [
            SqlValue::from(new.handle.as_str()),
            SqlValue::from(new.name.as_str()),
            SqlValue::from(new.description.clone()),
            SqlValue::from(new.num_employees),
            SqlValue::from(new.logo_url.clone()),
        ];
        let rows = self
            .storage
            .execute(&sql, &params)
            .await
            .map_err(|e| duplicate_on_conflict(e, &new.handle, Some(&new.name)))?;

        let organization = inserted(rows)?;
        tracing::info!("organization created");
        Ok(organization)
    }

    /// All organizations ordered by name, optionally filtered.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: Option<&OrganizationFilter>) -> RepoResult<Vec<Organization>> {
        let fragment = match filter {
            Some(filter) => filter.to_where_clause()?,
            None => QueryFragment::default(),
        };
        let sql = select_sql(COLUMNS, "organizations", &fragment, "name");
        let rows = self.storage.execute(&sql, &fragment.params).await?;
        Ok(all(rows)?)
    }

    /// One organization with all of its postings (ordered by id).
    #[instrument(skip(self))]
    pub async fn get(&self, handle: &str) -> RepoResult<OrganizationDetail> {
        let sql = format!("SELECT {COLUMNS} FROM organizations WHERE handle = $1");
        let rows = self
            .storage
            .execute(&sql, &[SqlValue::from(handle)])
            .await?;
        let organization: Organization =
            first(rows)?.ok_or_else(|| RepoError::not_found(ENTITY, handle))?;

        let sql = format!(
            "SELECT {POSTING_COLUMNS} FROM postings WHERE organization_handle = $1 ORDER BY id"
        );
        let rows = self
            .storage
            .execute(&sql, &[SqlValue::from(handle)])
            .await?;
        let postings: Vec<Posting> = all(rows)?;

        Ok(OrganizationDetail {
            organization,
            postings,
        })
    }

    /// Apply a partial update (`name`, `description`, `numEmployees`, `logoUrl`).
    #[instrument(skip(self, update), fields(fields = update.len()))]
    pub async fn update(&self, handle: &str, update: &PartialUpdate) -> RepoResult<Organization> {
        check_update_fields(update, UPDATABLE, IMMUTABLE)?;
        let set = sql_for_partial_update(update, &FIELDS)?;

        let sql = format!(
            "UPDATE organizations
             SET {}
             WHERE handle = ${}
             RETURNING {COLUMNS}",
            set.clause,
            set.next_placeholder()
        );
        let new_name = update.iter().find_map(|(field, value)| match (field, value) {
            ("name", SqlValue::Text(name)) => Some(name.clone()),
            _ => None,
        });
        let mut params = set.params;
        params.push(SqlValue::from(handle));

        let rows = self
            .storage
            .execute(&sql, &params)
            .await
            .map_err(|e| duplicate_on_conflict(e, handle, new_name.as_deref()))?;

        first(rows)?.ok_or_else(|| RepoError::not_found(ENTITY, handle))
    }

    /// Delete an organization; its postings go with it.
    #[instrument(skip(self))]
    pub async fn remove(&self, handle: &str) -> RepoResult<()> {
        let rows = self
            .storage
            .execute(
                "DELETE FROM organizations WHERE handle = $1 RETURNING handle",
                &[SqlValue::from(handle)],
            )
            .await?;
        if rows.is_empty() {
            return Err(RepoError::not_found(ENTITY, handle));
        }
        tracing::info!("organization removed");
        Ok(())
    }
}

/// Name the key that collided: the organization name when the name
/// constraint fired, the handle otherwise.
fn duplicate_on_conflict(err: StorageError, handle: &str, name: Option<&str>) -> RepoError {
    match err {
        StorageError::UniqueViolation(msg) => match name {
            Some(name) if msg.contains(NAME_CONSTRAINT) => {
                RepoError::duplicate("organization name", name)
            }
            _ => RepoError::duplicate(ENTITY, handle),
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ScriptedStorage;
    use serde_json::json;

    fn repo() -> (Arc<ScriptedStorage>, OrganizationRepository) {
        let storage = ScriptedStorage::arc();
        let repo = OrganizationRepository::new(storage.clone());
        (storage, repo)
    }

    fn c1_row() -> serde_json::Value {
        json!({
            "handle": "c1",
            "name": "C1",
            "description": "Desc1",
            "numEmployees": 1,
            "logoUrl": "http://c1.img"
        })
    }

    fn new_c1() -> NewOrganization {
        NewOrganization {
            handle: "c1".to_string(),
            name: "C1".to_string(),
            description: Some("Desc1".to_string()),
            num_employees: Some(1),
            logo_url: Some("http://c1.img".to_string()),
        }
    }

    #[tokio::test]
    async fn create_inserts_after_precheck() {
        let (storage, repo) = repo();
        storage.push_empty().push_rows([c1_row()]);

        let org = repo.create(&new_c1()).await.unwrap();

        assert_eq!(org.handle, "c1");
        assert_eq!(org.num_employees, Some(1));
        let calls = storage.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].sql.starts_with("INSERT INTO organizations"));
        assert_eq!(calls[1].params.len(), 5);
    }

    #[tokio::test]
    async fn creating_the_same_handle_twice_is_a_duplicate() {
        let (storage, repo) = repo();
        storage
            .push_empty()
            .push_rows([c1_row()])
            .push_rows([json!({"handle": "c1"})]);

        repo.create(&new_c1()).await.unwrap();
        let err = repo.create(&new_c1()).await.unwrap_err();

        assert_eq!(err, RepoError::duplicate("organization", "c1"));
        assert_eq!(storage.call_count(), 3);
    }

    #[tokio::test]
    async fn unique_violation_on_insert_is_a_duplicate() {
        let (storage, repo) = repo();
        storage
            .push_empty()
            .push_error(StorageError::UniqueViolation("organizations_pkey".to_string()));

        let err = repo.create(&new_c1()).await.unwrap_err();

        assert!(matches!(err, RepoError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn name_collision_reports_the_name() {
        let (storage, repo) = repo();
        storage.push_empty().push_error(StorageError::UniqueViolation(
            r#"database error in execute: duplicate key value violates unique constraint "organizations_name_key""#
                .to_string(),
        ));

        let err = repo.create(&new_c1()).await.unwrap_err();

        assert_eq!(err, RepoError::duplicate("organization name", "C1"));
    }

    #[tokio::test]
    async fn renaming_onto_a_taken_name_reports_the_name() {
        let (storage, repo) = repo();
        storage.push_error(StorageError::UniqueViolation(
            r#"duplicate key value violates unique constraint "organizations_name_key""#.to_string(),
        ));

        let err = repo
            .update("c1", &PartialUpdate::new().set("name", "C2"))
            .await
            .unwrap_err();

        assert_eq!(err, RepoError::duplicate("organization name", "C2"));
        assert_eq!(err.to_string(), "duplicate organization name: C2");
    }

    #[tokio::test]
    async fn list_without_filters_has_no_where_clause() {
        let (storage, repo) = repo();
        storage.push_rows([c1_row()]);

        let orgs = repo.list(Some(&OrganizationFilter::default())).await.unwrap();

        assert_eq!(orgs.len(), 1);
        let call = &storage.calls()[0];
        assert!(!call.sql.contains("WHERE"));
        assert!(call.sql.ends_with("ORDER BY name"));
        assert!(call.params.is_empty());
    }

    #[tokio::test]
    async fn list_applies_filters() {
        let (storage, repo) = repo();
        let filter = OrganizationFilter {
            name_like: Some("c".to_string()),
            min_employees: Some(2),
            max_employees: None,
        };

        repo.list(Some(&filter)).await.unwrap();

        let call = &storage.calls()[0];
        assert!(call.sql.contains(r#"WHERE "name" ILIKE $1 AND "num_employees" >= $2 ORDER BY name"#));
        assert_eq!(call.params, vec![SqlValue::from("%c%"), SqlValue::Int(2)]);
    }

    #[tokio::test]
    async fn inverted_range_fails_before_storage() {
        let (storage, repo) = repo();
        let filter = OrganizationFilter {
            name_like: None,
            min_employees: Some(10),
            max_employees: Some(5),
        };

        let err = repo.list(Some(&filter)).await.unwrap_err();

        assert!(matches!(err, RepoError::InvalidRange { .. }));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn get_attaches_postings() {
        let (storage, repo) = repo();
        storage.push_rows([c1_row()]).push_rows([
            json!({"id": 1, "title": "j1", "salary": 10, "equity": 0.1, "organizationHandle": "c1"}),
            json!({"id": 2, "title": "j2", "salary": null, "equity": null, "organizationHandle": "c1"}),
        ]);

        let detail = repo.get("c1").await.unwrap();

        assert_eq!(detail.organization.name, "C1");
        assert_eq!(detail.postings.len(), 2);
        assert_eq!(detail.postings[1].salary, None);
    }

    #[tokio::test]
    async fn get_unknown_handle_is_not_found() {
        let (storage, repo) = repo();
        storage.push_empty();

        let err = repo.get("nope").await.unwrap_err();

        assert_eq!(err, RepoError::not_found("organization", "nope"));
        assert_eq!(storage.call_count(), 1);
    }

    #[tokio::test]
    async fn update_appends_handle_as_last_parameter() {
        let (storage, repo) = repo();
        storage.push_rows([c1_row()]);
        let update = PartialUpdate::new().set("name", "C1 Inc").set("numEmployees", 40_i64);

        repo.update("c1", &update).await.unwrap();

        let call = &storage.calls()[0];
        assert!(call.sql.contains(r#"SET "name"=$1, "num_employees"=$2"#));
        assert!(call.sql.contains("WHERE handle = $3"));
        assert_eq!(
            call.params,
            vec![SqlValue::from("C1 Inc"), SqlValue::Int(40), SqlValue::from("c1")]
        );
    }

    #[tokio::test]
    async fn update_of_missing_handle_is_not_found() {
        let (storage, repo) = repo();
        storage.push_empty();

        let err = repo
            .update("nope", &PartialUpdate::new().set("name", "x"))
            .await
            .unwrap_err();

        assert_eq!(err, RepoError::not_found("organization", "nope"));
    }

    #[tokio::test]
    async fn update_rejects_bad_fields_without_storage() {
        let (storage, repo) = repo();

        let err = repo.update("c1", &PartialUpdate::new()).await.unwrap_err();
        assert_eq!(err, RepoError::EmptyInput);

        let err = repo
            .update("c1", &PartialUpdate::new().set("handle", "c9"))
            .await
            .unwrap_err();
        assert_eq!(err, RepoError::ImmutableField("handle".to_string()));

        let err = repo
            .update("c1", &PartialUpdate::new().set("num_employees; --", 1_i64))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::UnknownField(_)));

        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn remove_missing_handle_is_not_found() {
        let (storage, repo) = repo();
        storage.push_rows([json!({"handle": "c1"})]).push_empty();

        repo.remove("c1").await.unwrap();
        let err = repo.remove("c1").await.unwrap_err();

        assert_eq!(err, RepoError::not_found("organization", "c1"));
    }

    #[tokio::test]
    async fn storage_failures_pass_through() {
        let (storage, repo) = repo();
        storage.push_error(StorageError::Database("connection reset".to_string()));

        let err = repo.list(None).await.unwrap_err();

        assert_eq!(
            err,
            RepoError::Storage(StorageError::Database("connection reset".to_string()))
        );
    }
}
