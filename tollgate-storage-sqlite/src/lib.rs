//! SQLite storage backend for tollgate
//!
//! [`SqliteRepositoryProvider`] implements every repository trait from
//! `tollgate-core` on top of a single [`SqlitePool`]. Timestamps are stored as
//! unix seconds.
//!
//! ```no_run
//! # async fn run() -> Result<(), tollgate_core::Error> {
//! use tollgate_core::repositories::RepositoryProvider;
//! use tollgate_storage_sqlite::SqliteRepositoryProvider;
//!
//! let provider = SqliteRepositoryProvider::connect("sqlite://tollgate.db?mode=rwc").await?;
//! provider.migrate().await?;
//! # Ok(())
//! # }
//! ```
pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteAccountRepository, SqliteLoginHistoryRepository, SqliteRepositoryProvider,
    SqliteSessionRepository,
};
pub use sqlx::SqlitePool;

use chrono::{DateTime, Utc};
use tollgate_core::{Error, error::StorageError};

pub(crate) fn from_timestamp(column: &str, seconds: i64) -> Result<DateTime<Utc>, Error> {
    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        StorageError::Database(format!("Invalid timestamp in {column}: {seconds}")).into()
    })
}

pub(crate) fn database_error(e: sqlx::Error) -> Error {
    tracing::error!(error = %e, "Database error");
    Error::Storage(StorageError::Database(e.to_string()))
}
