//! Repository error model.

use thiserror::Error;

/// Result type used by the builders and repositories.
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository-level error.
///
/// Every variant except `Storage` is a deterministic input or state failure;
/// none of them are worth retrying.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepoError {
    /// A partial update carried no fields.
    #[error("no data to update")]
    EmptyInput,

    /// A minimum bound exceeds the maximum bound of the same dimension.
    #[error("invalid range for {dimension}: minimum {min} exceeds maximum {max}")]
    InvalidRange {
        dimension: &'static str,
        min: i64,
        max: i64,
    },

    /// A numeric search bound is negative.
    #[error("{filter} must not be negative, got {value}")]
    NegativeBound { filter: &'static str, value: i64 },

    /// A key could not be parsed into the entity's identifier type.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// An entity with the same natural key already exists.
    #[error("duplicate {entity}: {key}")]
    Duplicate { entity: &'static str, key: String },

    /// The referenced parent entity does not exist.
    #[error("no such {entity}: {key}")]
    MissingParent { entity: &'static str, key: String },

    #[error("no {entity}: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The caller tried to change a field that is fixed at creation time.
    #[error("field '{0}' cannot be changed")]
    ImmutableField(String),

    /// The caller tried to change a field the entity does not expose.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// Opaque passthrough from the storage layer.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl RepoError {
    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            key: key.into(),
        }
    }

    pub fn missing_parent(entity: &'static str, key: impl Into<String>) -> Self {
        Self::MissingParent {
            entity,
            key: key.into(),
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }
}

/// Storage-layer failure.
///
/// Constraint violations are split out so repositories can translate the
/// storage backstops (unique keys, foreign keys) into repository errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("row decode failed: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(String),
}
