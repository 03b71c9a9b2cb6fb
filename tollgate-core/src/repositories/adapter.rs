use crate::{
    Error, Session,
    account::{Account, AccountId, LockoutState, NewAccount},
    history::LoginHistoryEntry,
    repositories::{
        AccountRepository, LoginHistoryRepository, RepositoryProvider, SessionRepository,
    },
    session::SessionToken,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Adapter that exposes a provider's account repository as an owned value
pub struct AccountRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AccountRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AccountRepository for AccountRepositoryAdapter<R> {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        self.provider.account().create(account).await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_email(email).await
    }

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error> {
        self.provider.account().set_password_hash(id, hash).await
    }

    async fn record_failed_attempt(
        &self,
        id: &AccountId,
        max_failed_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LockoutState>, Error> {
        self.provider
            .account()
            .record_failed_attempt(id, max_failed_attempts, now)
            .await
    }

    async fn clear_expired_lock(
        &self,
        id: &AccountId,
        locked_before: DateTime<Utc>,
    ) -> Result<bool, Error> {
        self.provider
            .account()
            .clear_expired_lock(id, locked_before)
            .await
    }

    async fn reset_lockout(&self, id: &AccountId) -> Result<bool, Error> {
        self.provider.account().reset_lockout(id).await
    }
}

pub struct LoginHistoryRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LoginHistoryRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LoginHistoryRepository for LoginHistoryRepositoryAdapter<R> {
    async fn append(&self, entry: LoginHistoryEntry) -> Result<LoginHistoryEntry, Error> {
        self.provider.login_history().append(entry).await
    }

    async fn recent(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<LoginHistoryEntry>, Error> {
        self.provider.login_history().recent(account_id, limit).await
    }
}

pub struct SessionRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> SessionRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> SessionRepository for SessionRepositoryAdapter<R> {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        self.provider.session().create(session).await
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        self.provider.session().find_by_token(token).await
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        self.provider.session().delete(token).await
    }

    async fn delete_by_account_id(&self, account_id: &AccountId) -> Result<(), Error> {
        self.provider.session().delete_by_account_id(account_id).await
    }

    async fn cleanup_expired(&self) -> Result<u64, Error> {
        self.provider.session().cleanup_expired().await
    }
}
