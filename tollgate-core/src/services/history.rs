use crate::{
    Error,
    account::AccountId,
    history::{ClientInfo, LoginHistoryEntry, RECENT_LOGIN_LIMIT},
    repositories::LoginHistoryRepository,
};
use chrono::Utc;
use std::sync::Arc;

/// Service for the login history log
pub struct LoginHistoryService<H: LoginHistoryRepository> {
    repository: Arc<H>,
}

impl<H: LoginHistoryRepository> LoginHistoryService<H> {
    pub fn new(repository: Arc<H>) -> Self {
        Self { repository }
    }

    /// Append an entry for a successful login, stamped with the current time
    pub async fn record(
        &self,
        account_id: &AccountId,
        client: &ClientInfo,
    ) -> Result<LoginHistoryEntry, Error> {
        let entry = LoginHistoryEntry::new(account_id, client, Utc::now());
        self.repository.append(entry).await
    }

    /// The most recent logins of an account, newest first
    pub async fn recent(&self, account_id: &AccountId) -> Result<Vec<LoginHistoryEntry>, Error> {
        self.repository.recent(account_id, RECENT_LOGIN_LIMIT).await
    }
}
