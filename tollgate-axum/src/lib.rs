//! # Tollgate Axum Integration
//!
//! Axum routes and middleware for [`tollgate`]. Every endpoint answers with
//! the `{success, message, payload}` envelope, errors included.
//!
//! | Route | Auth | Purpose |
//! | --- | --- | --- |
//! | `POST /signup` | no | create an account |
//! | `POST /login` | no | verify credentials, issue a token and set the cookie |
//! | `POST /logout` | no | revoke the session and clear the cookie |
//! | `POST /change-password` | yes | change the password |
//! | `GET /login-history` | yes | the 20 most recent logins |
//! | `GET /me` | no | the current profile, or `null` |
//! | `GET /health` | no | storage health |
//!
//! Clients authenticate with `Authorization: Bearer <token>` or with the
//! `auth-token` cookie set by `/login`.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use tollgate::TollgateBuilder;
//! use tollgate_axum::CookieConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tollgate = TollgateBuilder::new()
//!         .with_sqlite("sqlite://tollgate.db?mode=rwc")
//!         .await?
//!         .apply_migrations(true)
//!         .build()
//!         .await?;
//!
//!     let auth_routes = tollgate_axum::routes(Arc::new(tollgate))
//!         .with_cookie_config(CookieConfig::development())
//!         .build();
//!
//!     let app = Router::new().nest("/api", auth_routes);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{AuthSession, OptionalAuthSession, SessionTokenFromRequest};
pub use middleware::{AuthState, auth_middleware, require_auth};
pub use routes::create_router;
pub use types::{
    ConnectionConfig, ConnectionInfo, CookieConfig, CookieSameSite, DEFAULT_COOKIE_NAME,
    HealthResponse, LoginPayload,
};

use axum::Router;
use std::sync::Arc;
use tollgate::Tollgate;
use tollgate_core::repositories::RepositoryProvider;

/// Create the authentication routes.
///
/// The returned builder defaults to a secure `auth-token` cookie and ignores
/// proxy headers. The built router can be nested at any path.
pub fn routes<R>(tollgate: Arc<Tollgate<R>>) -> AuthRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AuthRouterBuilder {
        tollgate,
        cookie_config: CookieConfig::default(),
        connection_config: ConnectionConfig::default(),
    }
}

/// Builder for configuring authentication routes
pub struct AuthRouterBuilder<R: RepositoryProvider> {
    tollgate: Arc<Tollgate<R>>,
    cookie_config: CookieConfig,
    connection_config: ConnectionConfig,
}

impl<R: RepositoryProvider + 'static> AuthRouterBuilder<R> {
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Take the client address from `X-Forwarded-For`. Only enable this
    /// behind a proxy that sets the header.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.connection_config.trust_proxy_headers = trust;
        self
    }

    pub fn build(self) -> Router {
        create_router(self.tollgate, self.cookie_config, self.connection_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AuthRouterBuilder<R>> for Router {
    fn from(builder: AuthRouterBuilder<R>) -> Self {
        builder.build()
    }
}
