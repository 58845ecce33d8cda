//! `hireboard-core`: storage-agnostic building blocks.
//!
//! This crate contains **pure** pieces only: the error taxonomy, record models,
//! identifiers, and the SQL fragment builders. No IO, no HTTP.

pub mod error;
pub mod filter;
pub mod id;
pub mod model;
pub mod sql;
pub mod value;

pub use error::{RepoError, RepoResult, StorageError};
pub use filter::{OrganizationFilter, PostingFilter, WhereClause};
pub use id::PostingId;
pub use model::{NewOrganization, NewPosting, Organization, OrganizationDetail, Posting};
pub use sql::{FieldMapping, PartialUpdate, quote_ident, sql_for_partial_update};
pub use value::{QueryFragment, SqlValue};
