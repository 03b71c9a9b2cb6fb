use crate::{Error, Session, account::AccountId, session::SessionToken};
use async_trait::async_trait;

/// Repository for opaque session data access
///
/// Only `Session::token_hash` is ever persisted. Lookups hash the presented
/// token and compare in constant time.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    async fn create(&self, session: Session) -> Result<Session, Error>;

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error>;

    async fn delete(&self, token: &SessionToken) -> Result<(), Error>;

    async fn delete_by_account_id(&self, account_id: &AccountId) -> Result<(), Error>;

    /// Remove sessions whose expiry has passed. Returns how many were removed.
    async fn cleanup_expired(&self) -> Result<u64, Error>;
}
