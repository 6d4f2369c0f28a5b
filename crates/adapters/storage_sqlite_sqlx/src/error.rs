//! Storage-specific error type wrapping sqlx errors.

use comforthub_domain::error::HubError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize entity attributes.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for HubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_wrap_database_error_as_storage_error() {
        let err: HubError = StorageError::Database(sqlx::Error::RowNotFound).into();
        assert!(matches!(err, HubError::Storage(_)));
        assert_eq!(err.to_string(), "storage error");
    }
}
