//! Infrastructure layer: storage boundary, Postgres adapter, repositories.

pub mod repo;
pub mod schema;
pub mod storage;

pub use repo::{OrganizationRepository, PostingRepository};
pub use storage::{PgStorage, Row, ScriptedStorage, Storage};
