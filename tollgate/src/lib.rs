//! # Tollgate
//!
//! Tollgate is a small email/password login service built around an
//! account-lockout guard. Repeated failed logins lock an account for a
//! configurable window, successful logins are recorded in a per-account
//! history, and every login issues either a signed JWT or an opaque
//! database-backed session.
//!
//! [`Tollgate`] wires the services from `tollgate-core` to a storage backend.
//! The HTTP surface lives in `tollgate-axum`.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tollgate::{ClientInfo, LoginRequest, SignupRequest, TollgateBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tollgate = TollgateBuilder::new()
//!         .with_sqlite("sqlite::memory:")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     tollgate
//!         .signup(&SignupRequest {
//!             email: "jane@example.com".to_string(),
//!             password: "Passw0rd".to_string(),
//!             name: "Jane".to_string(),
//!             confirm_password: None,
//!         })
//!         .await?;
//!
//!     let outcome = tollgate
//!         .login(
//!             &LoginRequest::new("jane@example.com", "Passw0rd"),
//!             &ClientInfo::default(),
//!         )
//!         .await?;
//!     println!("Logged in as {}", outcome.profile.email);
//!     Ok(())
//! }
//! ```
pub mod builder;

use std::sync::Arc;

use chrono::Duration;
use tollgate_core::{
    repositories::{
        AccountRepositoryAdapter, LoginHistoryRepositoryAdapter, RepositoryProvider,
        SessionRepositoryAdapter,
    },
    services::{
        AccountService, LockoutService, LoginHistoryService, LoginService, SessionService,
    },
    session::{DEFAULT_SESSION_TTL_MINUTES, JwtSessionProvider, OpaqueSessionProvider},
};

pub use builder::{TollgateBuilder, TollgateBuilderError};

/// Re-export core types from tollgate_core
///
/// These types are commonly used when working with the Tollgate API.
pub use tollgate_core::{
    AccountId, AccountProfile, ApiResponse, Argon2PasswordHasher, ChangePasswordRequest,
    ClientInfo, Error, ErrorKind, LockoutPolicy, LoginHistoryEntry, LoginRequest, PasswordHasher,
    Session, SessionToken, SignupRequest,
    services::LoginOutcome,
    session::{JwtAlgorithm, JwtClaims, JwtConfig, SessionProvider},
};
pub use tollgate_core::error;

#[cfg(feature = "sqlite")]
pub use tollgate_storage_sqlite::SqliteRepositoryProvider;

type Accounts<R> = AccountRepositoryAdapter<R>;
type History<R> = LoginHistoryRepositoryAdapter<R>;

/// How sessions are issued and how long they live.
///
/// # Example
///
/// ```rust
/// use tollgate::{JwtConfig, SessionConfig};
///
/// let config = SessionConfig::default().with_jwt(JwtConfig::new_hs256(b"secret".to_vec()));
/// assert_eq!(config.expires_in, chrono::Duration::minutes(180));
/// ```
#[derive(Clone)]
pub struct SessionConfig {
    /// The duration until the session expires
    pub expires_in: Duration,
    /// Session provider type
    pub provider_type: SessionProviderType,
}

/// Type of session provider to use
#[derive(Clone)]
pub enum SessionProviderType {
    /// Use opaque tokens stored in database
    Opaque,
    /// Use self-contained JWT tokens
    Jwt(JwtConfig),
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            expires_in: Duration::minutes(DEFAULT_SESSION_TTL_MINUTES),
            provider_type: SessionProviderType::Opaque,
        }
    }
}

impl SessionConfig {
    pub fn with_jwt(mut self, jwt_config: JwtConfig) -> Self {
        self.provider_type = SessionProviderType::Jwt(jwt_config);
        self
    }

    pub fn expires_in(mut self, duration: Duration) -> Self {
        self.expires_in = duration;
        self
    }

    pub fn is_jwt(&self) -> bool {
        matches!(self.provider_type, SessionProviderType::Jwt(_))
    }
}

/// The main coordinator that owns the services and the storage backend.
///
/// Every method returns [`tollgate_core::Error`]; use [`Error::kind`] and
/// [`Error::public_message`] to turn failures into client responses.
pub struct Tollgate<R: RepositoryProvider> {
    repositories: Arc<R>,
    accounts: Arc<AccountService<Accounts<R>>>,
    lockout: Arc<LockoutService<Accounts<R>>>,
    history: Arc<LoginHistoryService<History<R>>>,
    sessions: Arc<SessionService>,
    login: LoginService<Accounts<R>, History<R>>,
    session_config: SessionConfig,
}

impl<R: RepositoryProvider> Tollgate<R> {
    /// Create an instance with opaque sessions and the default lockout policy.
    pub fn new(repositories: Arc<R>) -> Self {
        Self::with_config(
            repositories,
            SessionConfig::default(),
            LockoutPolicy::default(),
        )
    }

    pub fn with_config(
        repositories: Arc<R>,
        session_config: SessionConfig,
        lockout_policy: LockoutPolicy,
    ) -> Self {
        let account_repo = Arc::new(AccountRepositoryAdapter::new(repositories.clone()));
        let history_repo = Arc::new(LoginHistoryRepositoryAdapter::new(repositories.clone()));
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);

        let session_provider: Arc<dyn SessionProvider> = match &session_config.provider_type {
            SessionProviderType::Opaque => Arc::new(OpaqueSessionProvider::new(Arc::new(
                SessionRepositoryAdapter::new(repositories.clone()),
            ))),
            SessionProviderType::Jwt(jwt_config) => {
                Arc::new(JwtSessionProvider::new(jwt_config.clone()))
            }
        };

        let accounts = Arc::new(AccountService::new(account_repo.clone(), hasher.clone()));
        let lockout = Arc::new(LockoutService::new(account_repo.clone(), lockout_policy));
        let history = Arc::new(LoginHistoryService::new(history_repo));
        let sessions = Arc::new(SessionService::new(
            session_provider,
            session_config.expires_in,
        ));
        let login = LoginService::new(
            account_repo,
            lockout.clone(),
            history.clone(),
            sessions.clone(),
            hasher,
        );

        Self {
            repositories,
            accounts,
            lockout,
            history,
            sessions,
            login,
            session_config,
        }
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    pub fn lockout_policy(&self) -> &LockoutPolicy {
        self.lockout.policy()
    }

    /// Run migrations for all repositories
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for all repositories
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Register a new account and return its profile.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AccountProfile, Error> {
        self.accounts.signup(request).await
    }

    /// Authenticate with email and password, subject to the lockout policy.
    pub async fn login(
        &self,
        request: &LoginRequest,
        client: &ClientInfo,
    ) -> Result<LoginOutcome, Error> {
        self.login.login(request, client).await
    }

    /// Change the password of an authenticated account.
    ///
    /// Existing sessions stay valid.
    pub async fn change_password(
        &self,
        account_id: &AccountId,
        request: &ChangePasswordRequest,
    ) -> Result<(), Error> {
        self.accounts.change_password(account_id, request).await
    }

    pub async fn profile(&self, account_id: &AccountId) -> Result<Option<AccountProfile>, Error> {
        self.accounts.profile(account_id).await
    }

    /// The most recent logins of an account, newest first.
    pub async fn login_history(
        &self,
        account_id: &AccountId,
    ) -> Result<Vec<LoginHistoryEntry>, Error> {
        self.history.recent(account_id).await
    }

    /// Resolve a bearer token to its session.
    pub async fn authenticate(&self, token: &SessionToken) -> Result<Session, Error> {
        self.sessions.resolve(token).await
    }

    /// End a session. JWTs cannot be revoked and stay valid until they expire.
    pub async fn logout(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions.revoke(token).await
    }

    /// Clear the lockout state of an account regardless of the lock window.
    pub async fn unlock(&self, account_id: &AccountId) -> Result<(), Error> {
        self.lockout.unlock(account_id).await
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<(), Error> {
        self.sessions.cleanup_expired().await
    }
}
