//! Repository error model.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `RepositoryError` as follows:
//!
//! | SQLx Error | RepositoryError | Scenario |
//! |------------|-----------------|----------|
//! | Database (unique / primary key violation) on a parent row | `DuplicateKey` | `create` raced another `create` with the same id |
//! | Database (any other constraint) | `Storage` | Dangling foreign key, CHECK violation, clashing item id |
//! | PoolClosed, Io, Tls, ... | `Storage` | Connectivity loss, closed pool |
//!
//! The originating `sqlx::Error` is always kept as the `source` of `Storage`.

use storefront_core::DomainError;
use thiserror::Error;

/// Boxed originating error kept behind `RepositoryError::Storage`.
pub type StorageSource = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// An entity could not be built, either from caller input or from a stored row.
    #[error(transparent)]
    Validation(#[from] DomainError),

    #[error("{entity} with id {id} already exists")]
    DuplicateKey { entity: &'static str, id: String },

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("storage failure in {operation}: {source}")]
    Storage {
        operation: &'static str,
        #[source]
        source: StorageSource,
    },
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn duplicate_key(entity: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            id: id.into(),
        }
    }

    pub fn storage(operation: &'static str, source: impl Into<StorageSource>) -> Self {
        Self::Storage {
            operation,
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Map SQLx errors to `RepositoryError::Storage`, keeping the original error.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    RepositoryError::storage(operation, err)
}

/// Map an insert failure on a table keyed by `id`: a unique violation means the
/// row already exists.
pub(crate) fn map_insert_error(
    operation: &'static str,
    entity: &'static str,
    id: &str,
    err: sqlx::Error,
) -> RepositoryError {
    if is_unique_violation(&err) {
        RepositoryError::duplicate_key(entity, id)
    } else {
        map_sqlx_error(operation, err)
    }
}

/// Check if an error is a unique / primary key constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn storage_keeps_source() {
        let err = map_sqlx_error("find_order", sqlx::Error::PoolClosed);
        assert!(matches!(err, RepositoryError::Storage { operation: "find_order", .. }));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("find_order"));
    }

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        let err = map_insert_error("insert_order", "order", "1", sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Storage { .. }));
    }

    #[test]
    fn domain_errors_convert_to_validation() {
        let err: RepositoryError = DomainError::validation("quantity must be positive").into();
        assert!(matches!(err, RepositoryError::Validation(_)));
        assert_eq!(err.to_string(), "validation failed: quantity must be positive");
    }
}
