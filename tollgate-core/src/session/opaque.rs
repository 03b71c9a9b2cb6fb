//! Stateful sessions keyed by a random opaque token.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::{
    Error, Session, SessionToken,
    account::{AccountId, AccountProfile},
    error::SessionError,
    history::ClientInfo,
    repositories::SessionRepository,
};

use super::provider::SessionProvider;

/// Every lookup is a storage round-trip; in exchange, logout really revokes
/// the token.
pub struct OpaqueSessionProvider<R: SessionRepository> {
    repository: Arc<R>,
}

impl<R: SessionRepository> OpaqueSessionProvider<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: SessionRepository> SessionProvider for OpaqueSessionProvider<R> {
    async fn create_session(
        &self,
        account: &AccountProfile,
        client: &ClientInfo,
        ttl: Duration,
    ) -> Result<Session, Error> {
        let session = Session::new(
            SessionToken::new_random(),
            &account.id,
            client,
            Utc::now(),
            ttl,
        );
        self.repository.create(session).await
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Session, Error> {
        let session = self
            .repository
            .find_by_token(token)
            .await?
            .ok_or(SessionError::NotFound)?;

        if session.is_expired() {
            self.repository.delete(token).await?;
            return Err(SessionError::Expired.into());
        }

        Ok(session)
    }

    async fn delete_session(&self, token: &SessionToken) -> Result<(), Error> {
        self.repository.delete(token).await
    }

    async fn delete_sessions_for_account(&self, account_id: &AccountId) -> Result<(), Error> {
        self.repository.delete_by_account_id(account_id).await
    }

    async fn cleanup_expired_sessions(&self) -> Result<(), Error> {
        let removed = self.repository.cleanup_expired().await?;
        tracing::debug!(removed, "Cleaned up expired sessions");
        Ok(())
    }
}
