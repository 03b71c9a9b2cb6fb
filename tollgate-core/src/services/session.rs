use crate::{
    Error, Session,
    account::{AccountId, AccountProfile},
    history::ClientInfo,
    session::{DEFAULT_SESSION_TTL_MINUTES, SessionProvider, SessionToken},
};
use chrono::Duration;
use std::sync::Arc;

/// Issues and resolves sessions through whichever provider is configured
pub struct SessionService {
    provider: Arc<dyn SessionProvider>,
    ttl: Duration,
}

impl SessionService {
    pub fn new(provider: Arc<dyn SessionProvider>, ttl: Duration) -> Self {
        Self { provider, ttl }
    }

    pub fn with_default_ttl(provider: Arc<dyn SessionProvider>) -> Self {
        Self::new(provider, Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn issue(
        &self,
        account: &AccountProfile,
        client: &ClientInfo,
    ) -> Result<Session, Error> {
        self.provider.create_session(account, client, self.ttl).await
    }

    pub async fn resolve(&self, token: &SessionToken) -> Result<Session, Error> {
        self.provider.get_session(token).await
    }

    pub async fn revoke(&self, token: &SessionToken) -> Result<(), Error> {
        self.provider.delete_session(token).await
    }

    pub async fn revoke_all(&self, account_id: &AccountId) -> Result<(), Error> {
        self.provider.delete_sessions_for_account(account_id).await
    }

    pub async fn cleanup_expired(&self) -> Result<(), Error> {
        self.provider.cleanup_expired_sessions().await
    }
}
