//! Versioned schema migrations
//!
//! Backends implement [`MigrationManager`] for their database and describe
//! each schema step as a [`Migration`]. Applied versions are recorded in the
//! `_tollgate_migrations` table so `up` is idempotent.

use async_trait::async_trait;
use sqlx::Database;
use thiserror::Error;
use tollgate_core::error::StorageError;

pub const MIGRATION_TABLE: &str = "_tollgate_migrations";

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

impl From<MigrationError> for tollgate_core::Error {
    fn from(e: MigrationError) -> Self {
        StorageError::Migration(e.to_string()).into()
    }
}

#[async_trait]
pub trait Migration<DB: Database>: Send + Sync {
    async fn up<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    async fn down<'a>(&'a self, conn: &'a mut <DB as Database>::Connection) -> Result<()>;

    /// Unique, increasing version used for ordering
    fn version(&self) -> i64;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MigrationRecord {
    pub version: i64,
    pub name: String,
    /// Unix seconds
    pub applied_at: i64,
}

#[async_trait]
pub trait MigrationManager<DB: Database>: Send + Sync {
    fn get_migration_table_name(&self) -> &str {
        MIGRATION_TABLE
    }

    /// Create the bookkeeping table if it does not exist
    async fn initialize(&self) -> Result<()>;

    /// Apply every migration not yet recorded, in version order
    async fn up(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    /// Roll back applied migrations, newest first
    async fn down(&self, migrations: &[Box<dyn Migration<DB>>]) -> Result<()>;

    async fn get_applied_migrations(&self) -> Result<Vec<MigrationRecord>>;

    async fn is_applied(&self, version: i64) -> Result<bool>;
}

/// Reject a migration list whose versions are not strictly increasing.
///
/// Run before applying anything so a misordered list fails without touching
/// the schema.
pub fn check_versions<DB: Database>(migrations: &[Box<dyn Migration<DB>>]) -> Result<()> {
    for pair in migrations.windows(2) {
        if pair[1].version() <= pair[0].version() {
            return Err(MigrationError::Migration(format!(
                "migration {} ({}) must come after {} ({})",
                pair[1].version(),
                pair[1].name(),
                pair[0].version(),
                pair[0].name()
            )));
        }
    }
    Ok(())
}
