use crate::{Error, account::AccountId, history::LoginHistoryEntry};
use async_trait::async_trait;

/// Append-only log of successful logins
#[async_trait]
pub trait LoginHistoryRepository: Send + Sync + 'static {
    async fn append(&self, entry: LoginHistoryEntry) -> Result<LoginHistoryEntry, Error>;

    /// The `limit` most recent entries for an account, newest first.
    async fn recent(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<LoginHistoryEntry>, Error>;
}
