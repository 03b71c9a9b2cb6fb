//! Persistence side of the account lockout guard.
//!
//! [`LockoutPolicy`] decides; this service writes the decision back. Every
//! write is a single atomic repository call that works on the stored row, so
//! concurrent attempts on one account are serialised by the store and none
//! of them is lost or retried.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    account::{Account, AccountId, LockoutState},
    error::AuthError,
    lockout::{LockoutDecision, LockoutPolicy},
    repositories::AccountRepository,
};

pub struct LockoutService<A: AccountRepository> {
    repository: Arc<A>,
    policy: LockoutPolicy,
}

impl<A: AccountRepository> LockoutService<A> {
    pub fn new(repository: Arc<A>, policy: LockoutPolicy) -> Self {
        Self { repository, policy }
    }

    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Pre-verification check.
    ///
    /// Returns the account to verify against, with an expired lock already
    /// cleared in storage, or `AuthError::AccountLocked` while the lock holds.
    pub async fn admit(&self, account: &Account, now: DateTime<Utc>) -> Result<Account, Error> {
        match self.policy.check(&account.lockout, now) {
            LockoutDecision::Proceed {
                lock_expired: false,
            } => Ok(account.clone()),
            decision @ LockoutDecision::RejectLocked { .. } => {
                Err(self.rejected(&account.id, decision))
            }
            LockoutDecision::Proceed { lock_expired: true } => {
                let locked_before = now
                    .checked_sub_signed(self.policy.lockout_period)
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);

                if self
                    .repository
                    .clear_expired_lock(&account.id, locked_before)
                    .await?
                {
                    tracing::info!(account_id = %account.id, "Lockout period elapsed; account unlocked");
                    return Ok(account.clone().with_lockout(LockoutState::default()));
                }

                // Another request changed the row first; judge what it left.
                let current = self.reload(&account.id).await?;
                match self.policy.check(&current.lockout, now) {
                    decision @ LockoutDecision::RejectLocked { .. } => {
                        Err(self.rejected(&current.id, decision))
                    }
                    LockoutDecision::Proceed { .. } => Ok(current),
                }
            }
        }
    }

    /// Count a failed verification. Returns the state now stored.
    pub async fn record_failure(
        &self,
        account: &Account,
        now: DateTime<Utc>,
    ) -> Result<LockoutState, Error> {
        if !self.policy.enabled {
            return Ok(account.lockout);
        }

        let stored = self
            .repository
            .record_failed_attempt(&account.id, self.policy.max_failed_attempts, now)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if stored.is_locked && stored.failed_login_attempts == self.policy.max_failed_attempts {
            tracing::warn!(
                account_id = %account.id,
                failed_login_attempts = stored.failed_login_attempts,
                "Account locked after repeated failed logins"
            );
        } else {
            tracing::debug!(
                account_id = %account.id,
                failed_login_attempts = stored.failed_login_attempts,
                "Failed login recorded"
            );
        }
        Ok(stored)
    }

    /// Reset the lockout state after a successful verification.
    pub async fn record_success(
        &self,
        account: &Account,
        _now: DateTime<Utc>,
    ) -> Result<LockoutState, Error> {
        if !self.policy.enabled {
            return Ok(account.lockout);
        }

        self.reset(&account.id).await?;
        Ok(LockoutState::default())
    }

    /// Administrative reset, regardless of the policy or the lock window.
    pub async fn unlock(&self, account_id: &AccountId) -> Result<(), Error> {
        self.reset(account_id).await?;
        tracing::info!(account_id = %account_id, "Account unlocked");
        Ok(())
    }

    async fn reset(&self, account_id: &AccountId) -> Result<(), Error> {
        if self.repository.reset_lockout(account_id).await? {
            Ok(())
        } else {
            Err(AuthError::AccountNotFound.into())
        }
    }

    async fn reload(&self, account_id: &AccountId) -> Result<Account, Error> {
        self.repository
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AuthError::AccountNotFound.into())
    }

    fn rejected(&self, account_id: &AccountId, decision: LockoutDecision) -> Error {
        let remaining_minutes = decision.remaining_minutes().unwrap_or(1);
        tracing::info!(
            account_id = %account_id,
            remaining_minutes,
            "Login rejected: account is locked"
        );
        AuthError::AccountLocked { remaining_minutes }.into()
    }
}
