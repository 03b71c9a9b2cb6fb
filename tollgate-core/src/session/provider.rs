//! The [`SessionProvider`] trait abstracts over stateful (opaque, stored)
//! and stateless (JWT) sessions.

use async_trait::async_trait;
use chrono::Duration;

use crate::{
    Error, Session, SessionToken,
    account::{AccountId, AccountProfile},
    history::ClientInfo,
};

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Issue a new session for `account`, valid for `ttl`.
    async fn create_session(
        &self,
        account: &AccountProfile,
        client: &ClientInfo,
        ttl: Duration,
    ) -> Result<Session, Error>;

    /// Resolve a token to its session. Expired or unknown tokens are errors.
    async fn get_session(&self, token: &SessionToken) -> Result<Session, Error>;

    /// Invalidate one token. A no-op for stateless providers.
    async fn delete_session(&self, token: &SessionToken) -> Result<(), Error>;

    /// Invalidate every session of an account. Stateless providers cannot
    /// honour this without a revocation list.
    async fn delete_sessions_for_account(&self, account_id: &AccountId) -> Result<(), Error>;

    async fn cleanup_expired_sessions(&self) -> Result<(), Error>;
}

#[async_trait]
impl SessionProvider for Box<dyn SessionProvider> {
    async fn create_session(
        &self,
        account: &AccountProfile,
        client: &ClientInfo,
        ttl: Duration,
    ) -> Result<Session, Error> {
        (**self).create_session(account, client, ttl).await
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Session, Error> {
        (**self).get_session(token).await
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<(), Error> {
        (**self).delete_session(token).await
    }

    async fn delete_sessions_for_account(&self, account_id: &AccountId) -> Result<(), Error> {
        (**self).delete_sessions_for_account(account_id).await
    }

    async fn cleanup_expired_sessions(&self) -> Result<(), Error> {
        (**self).cleanup_expired_sessions().await
    }
}
