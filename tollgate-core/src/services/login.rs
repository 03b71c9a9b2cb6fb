//! Login orchestration
//!
//! The order of steps is fixed: validate input, look the account up, run the
//! lockout pre-check, verify the password, then either record the failure or
//! reset the lockout state, append to the history and issue a session.
//!
//! An unknown email, a wrong password and the failure that trips the lock all
//! produce the same `AuthError::InvalidCredentials`.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error, Session,
    account::AccountProfile,
    crypto::PasswordHasher,
    error::AuthError,
    history::ClientInfo,
    repositories::{AccountRepository, LoginHistoryRepository},
    request::LoginRequest,
    services::{LockoutService, LoginHistoryService, SessionService},
};

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub profile: AccountProfile,
    pub session: Session,
}

pub struct LoginService<A: AccountRepository, H: LoginHistoryRepository> {
    accounts: Arc<A>,
    lockout: Arc<LockoutService<A>>,
    history: Arc<LoginHistoryService<H>>,
    sessions: Arc<SessionService>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<A: AccountRepository, H: LoginHistoryRepository> LoginService<A, H> {
    pub fn new(
        accounts: Arc<A>,
        lockout: Arc<LockoutService<A>>,
        history: Arc<LoginHistoryService<H>>,
        sessions: Arc<SessionService>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            accounts,
            lockout,
            history,
            sessions,
            hasher,
        }
    }

    pub async fn login(
        &self,
        request: &LoginRequest,
        client: &ClientInfo,
    ) -> Result<LoginOutcome, Error> {
        request.validate()?;

        let Some(account) = self.accounts.find_by_email(&request.email).await? else {
            tracing::debug!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        };

        let account = self.lockout.admit(&account, Utc::now()).await?;

        if !self
            .hasher
            .verify(&request.password, &account.password_hash)
            .await?
        {
            self.lockout.record_failure(&account, Utc::now()).await?;
            return Err(AuthError::InvalidCredentials.into());
        }

        self.lockout.record_success(&account, Utc::now()).await?;
        self.history.record(&account.id, client).await?;

        let profile = account.profile();
        let session = self.sessions.issue(&profile, client).await?;

        tracing::info!(account_id = %account.id, "Login succeeded");
        Ok(LoginOutcome { profile, session })
    }
}
