//! Database operations for the catalog.
//!
//! # Schema: `catalog`
//!
//! ## Tables
//!
//! - `countries` - Countries, with a `version` concurrency token
//! - `states` - States/departments, unique by `(country_id, name)`
//! - `cities` - Cities, unique by `(state_id, name)`
//! - `products` - Catalog products
//! - `product_images` - Blob identifiers of product images
//!
//! Sessions live in `admin.session` (managed by `tower-sessions-sqlx-store`).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p shopping-cli -- migrate
//! ```

pub mod hierarchy;
pub mod memory;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use hierarchy::{HierarchyStore, PgHierarchyRepository};
pub use memory::MemoryHierarchyStore;
pub use products::ProductRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Requested entity (or the parent it references) was not found.
    #[error("not found")]
    NotFound,

    /// A sibling with the same name already exists under the same parent.
    #[error("duplicate name")]
    DuplicateName,

    /// The entity still has child records.
    #[error("record has related records")]
    HasDependents,

    /// The concurrency token no longer matches the stored row.
    #[error("record was modified concurrently")]
    ConcurrencyConflict,

    /// Any other storage failure, carrying the underlying message.
    #[error("{0}")]
    StorageFailure(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

/// Kind of statement that produced a write error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Delete,
}

/// Map a failed write to a repository condition.
///
/// - unique violations, or any message mentioning "duplicate", become
///   [`RepositoryError::DuplicateName`]
/// - foreign-key violations become [`RepositoryError::HasDependents`] on
///   delete and [`RepositoryError::NotFound`] otherwise (dangling parent)
/// - everything else is a [`RepositoryError::StorageFailure`]
#[must_use]
pub fn classify_write_error(err: &sqlx::Error, kind: WriteKind) -> RepositoryError {
    match err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db_err) => match db_err.kind() {
            ErrorKind::UniqueViolation => RepositoryError::DuplicateName,
            ErrorKind::ForeignKeyViolation if kind == WriteKind::Delete => {
                RepositoryError::HasDependents
            }
            ErrorKind::ForeignKeyViolation => RepositoryError::NotFound,
            _ => classify_message(db_err.message()),
        },
        other => classify_message(&other.to_string()),
    }
}

fn classify_message(message: &str) -> RepositoryError {
    if message.to_lowercase().contains("duplicate") {
        RepositoryError::DuplicateName
    } else {
        RepositoryError::StorageFailure(message.to_string())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_not_found() {
        assert_eq!(
            classify_write_error(&sqlx::Error::RowNotFound, WriteKind::Update),
            RepositoryError::NotFound
        );
        assert_eq!(
            RepositoryError::from(sqlx::Error::RowNotFound),
            RepositoryError::NotFound
        );
    }

    #[test]
    fn test_duplicate_message_is_duplicate_name() {
        let err = sqlx::Error::Protocol("Cannot insert duplicate key row".to_string());
        assert_eq!(
            classify_write_error(&err, WriteKind::Insert),
            RepositoryError::DuplicateName
        );
    }

    #[test]
    fn test_other_errors_keep_message() {
        let err = sqlx::Error::PoolTimedOut;
        let classified = classify_write_error(&err, WriteKind::Delete);
        assert_eq!(
            classified,
            RepositoryError::StorageFailure(sqlx::Error::PoolTimedOut.to_string())
        );
    }
}
