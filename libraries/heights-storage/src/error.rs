/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violated
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Stored value could not be mapped back to a domain type
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Map a unique-constraint failure to `Duplicate`, pass everything else through
    pub(crate) fn from_insert(err: sqlx::Error, what: impl Into<String>) -> Self {
        let unique = err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation());
        if unique {
            Self::Duplicate(what.into())
        } else {
            Self::Database(err)
        }
    }
}

impl From<StorageError> for heights_core::CoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => Self::not_found(entity, id),
            StorageError::Duplicate(what) => Self::duplicate(what),
            other => Self::storage(other.to_string()),
        }
    }
}
