use crate::{
    Error,
    account::{Account, AccountId, LockoutState, NewAccount},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository for account data access
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Insert a new account with a clear lockout state.
    ///
    /// Fails with `AuthError::EmailAlreadyRegistered` when the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, Error>;

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Emails are matched exactly as stored.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error>;

    /// Count one failed login in a single atomic step and return the state
    /// now stored, or `None` when the account does not exist.
    ///
    /// The counter is incremented on the stored row, not on a value read
    /// earlier, so concurrent failures are never lost. The row locks once the
    /// counter reaches `max_failed_attempts`; an existing lock keeps its
    /// original `locked_at`, and a lock without a timestamp keeps reading as
    /// locked since the epoch. See [`crate::LockoutPolicy::after_attempt`].
    async fn record_failed_attempt(
        &self,
        id: &AccountId,
        max_failed_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LockoutState>, Error>;

    /// Clear the lockout columns if the row is still locked and the lock was
    /// stamped at or before `locked_before`. Returns whether a row changed.
    async fn clear_expired_lock(
        &self,
        id: &AccountId,
        locked_before: DateTime<Utc>,
    ) -> Result<bool, Error>;

    /// Unconditionally clear the lockout columns. Returns `false` when the
    /// account does not exist.
    async fn reset_lockout(&self, id: &AccountId) -> Result<bool, Error>;
}
