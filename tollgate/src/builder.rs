//! Builder pattern for constructing Tollgate instances
//!
//! The builder tracks whether storage has been configured in its type, so
//! `build()` only exists once a backend is chosen.
//!
//! # Example
//!
//! ```rust,no_run
//! use tollgate::{LockoutPolicy, TollgateBuilder};
//! use chrono::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tollgate = TollgateBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .with_lockout_policy(LockoutPolicy::new(3, Duration::minutes(30)))
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     tollgate.health_check().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use chrono::Duration;
use tollgate_core::repositories::RepositoryProvider;

use crate::{JwtConfig, LockoutPolicy, SessionConfig, Tollgate};

/// Errors that can occur when building a Tollgate instance.
#[derive(Debug, thiserror::Error)]
pub enum TollgateBuilderError {
    /// Failed to connect to storage backend
    #[error("Storage connection failed: {0}")]
    StorageConnection(String),

    /// Failed to run database migrations
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Marker type indicating no storage has been configured yet.
pub struct NoStorage;

/// Marker type indicating storage has been configured.
pub struct WithStorage<R: RepositoryProvider> {
    repositories: Arc<R>,
}

/// A type-state builder for [`Tollgate`].
///
/// # Defaults
///
/// - Session provider: opaque (database-backed)
/// - Session expiry: 180 minutes
/// - Lockout: enabled, 5 attempts, 15 minute window
/// - Apply migrations: false
pub struct TollgateBuilder<Storage> {
    storage: Storage,
    session_config: SessionConfig,
    lockout_policy: LockoutPolicy,
    apply_migrations: bool,
}

impl Default for TollgateBuilder<NoStorage> {
    fn default() -> Self {
        Self::new()
    }
}

impl TollgateBuilder<NoStorage> {
    pub fn new() -> Self {
        Self {
            storage: NoStorage,
            session_config: SessionConfig::default(),
            lockout_policy: LockoutPolicy::default(),
            apply_migrations: false,
        }
    }

    /// Use an already constructed repository provider.
    pub fn with_repositories<R: RepositoryProvider>(
        self,
        repositories: Arc<R>,
    ) -> TollgateBuilder<WithStorage<R>> {
        TollgateBuilder {
            storage: WithStorage { repositories },
            session_config: self.session_config,
            lockout_policy: self.lockout_policy,
            apply_migrations: self.apply_migrations,
        }
    }
}

#[cfg(feature = "sqlite")]
impl TollgateBuilder<NoStorage> {
    /// Configure SQLite storage by connecting to the given URL, e.g.
    /// `sqlite::memory:` or `sqlite://tollgate.db?mode=rwc`.
    pub async fn with_sqlite(
        self,
        url: &str,
    ) -> Result<TollgateBuilder<WithStorage<crate::SqliteRepositoryProvider>>, TollgateBuilderError>
    {
        let repositories = crate::SqliteRepositoryProvider::connect(url)
            .await
            .map_err(|e| TollgateBuilderError::StorageConnection(e.to_string()))?;

        Ok(self.with_repositories(Arc::new(repositories)))
    }

    /// Configure SQLite storage with an existing connection pool.
    pub fn with_sqlite_pool(
        self,
        pool: tollgate_storage_sqlite::SqlitePool,
    ) -> TollgateBuilder<WithStorage<crate::SqliteRepositoryProvider>> {
        self.with_repositories(Arc::new(crate::SqliteRepositoryProvider::new(pool)))
    }
}

impl<R: RepositoryProvider> TollgateBuilder<WithStorage<R>> {
    /// Set the session expiration duration. Default: 180 minutes.
    pub fn with_session_expiry(mut self, duration: Duration) -> Self {
        self.session_config.expires_in = duration;
        self
    }

    /// Issue signed JWTs instead of opaque database sessions.
    ///
    /// JWT sessions are not looked up on each request, so they cannot be
    /// revoked before they expire.
    pub fn with_jwt_sessions(mut self, config: JwtConfig) -> Self {
        self.session_config = self.session_config.with_jwt(config);
        self
    }

    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn with_lockout_policy(mut self, policy: LockoutPolicy) -> Self {
        self.lockout_policy = policy;
        self
    }

    /// Apply database migrations in `build()`. Default: false
    pub fn apply_migrations(mut self, apply: bool) -> Self {
        self.apply_migrations = apply;
        self
    }

    /// Build the Tollgate instance, running migrations first if requested.
    pub async fn build(self) -> Result<Tollgate<R>, TollgateBuilderError> {
        if self.session_config.expires_in <= Duration::zero() {
            return Err(TollgateBuilderError::InvalidConfiguration(
                "session expiry must be positive".to_string(),
            ));
        }
        if self.lockout_policy.enabled
            && (self.lockout_policy.max_failed_attempts == 0
                || self.lockout_policy.lockout_period <= Duration::zero())
        {
            return Err(TollgateBuilderError::InvalidConfiguration(
                "lockout policy needs at least one attempt and a positive period".to_string(),
            ));
        }

        if self.apply_migrations {
            self.storage
                .repositories
                .migrate()
                .await
                .map_err(|e| TollgateBuilderError::Migration(e.to_string()))?;
            tracing::debug!("Migrations applied");
        }

        tracing::info!(
            jwt_sessions = self.session_config.is_jwt(),
            session_minutes = self.session_config.expires_in.num_minutes(),
            lockout_enabled = self.lockout_policy.enabled,
            "Tollgate configured"
        );

        Ok(Tollgate::with_config(
            self.storage.repositories,
            self.session_config,
            self.lockout_policy,
        ))
    }
}
