//! In-memory repositories and a counting hasher shared by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::{
    Error, Session,
    account::{Account, AccountId, LockoutState, NewAccount},
    crypto::PasswordHasher,
    error::{AuthError, StorageError},
    history::LoginHistoryEntry,
    lockout::{AttemptOutcome, LockoutPolicy},
    repositories::{AccountRepository, LoginHistoryRepository, SessionRepository},
    session::SessionToken,
};

#[derive(Default)]
pub(crate) struct MockAccountRepository {
    accounts: Mutex<HashMap<AccountId, Account>>,
    /// Applied just before the next lockout write, simulating a writer that
    /// sneaks in between read and write.
    interference: Mutex<Vec<LockoutState>>,
    fail_writes: AtomicBool,
    lockout_writes: AtomicUsize,
}

impl MockAccountRepository {
    pub(crate) fn insert(&self, account: Account) {
        self.accounts
            .lock()
            .unwrap()
            .insert(account.id.clone(), account);
    }

    pub(crate) fn get(&self, id: &AccountId) -> Account {
        self.accounts.lock().unwrap().get(id).cloned().unwrap()
    }

    pub(crate) fn lockout(&self, id: &AccountId) -> LockoutState {
        self.get(id).lockout
    }

    pub(crate) fn interfere_with(&self, states: Vec<LockoutState>) {
        *self.interference.lock().unwrap() = states;
    }

    pub(crate) fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub(crate) fn lockout_writes(&self) -> usize {
        self.lockout_writes.load(Ordering::SeqCst)
    }

    /// Runs `update` on the stored lockout state under the map lock, after
    /// any pending interference. `None` when the account is missing.
    fn write_lockout<T>(
        &self,
        id: &AccountId,
        update: impl FnOnce(&mut LockoutState) -> T,
    ) -> Result<Option<T>, Error> {
        self.lockout_writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Database("disk I/O error".to_string()).into());
        }

        let mut accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get_mut(id) else {
            return Ok(None);
        };

        let mut interference = self.interference.lock().unwrap();
        if !interference.is_empty() {
            account.lockout = interference.remove(0);
        }

        Ok(Some(update(&mut account.lockout)))
    }
}

#[async_trait]
impl AccountRepository for MockAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let now = Utc::now();
        let account = Account {
            id: account.id,
            email: account.email,
            name: account.name,
            password_hash: account.password_hash,
            lockout: LockoutState::default(),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        Ok(self.accounts.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(id).ok_or(StorageError::NotFound)?;
        account.password_hash = hash.to_string();
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        id: &AccountId,
        max_failed_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LockoutState>, Error> {
        let policy = LockoutPolicy::new(max_failed_attempts, Duration::zero());
        self.write_lockout(id, |lockout| {
            *lockout = policy.after_attempt(lockout, AttemptOutcome::Failure, now);
            *lockout
        })
    }

    async fn clear_expired_lock(
        &self,
        id: &AccountId,
        locked_before: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let cleared = self.write_lockout(id, |lockout| {
            let expired = lockout.is_locked
                && lockout.locked_at.unwrap_or(DateTime::UNIX_EPOCH) <= locked_before;
            if expired {
                *lockout = LockoutState::default();
            }
            expired
        })?;
        Ok(cleared.unwrap_or(false))
    }

    async fn reset_lockout(&self, id: &AccountId) -> Result<bool, Error> {
        let reset = self.write_lockout(id, |lockout| *lockout = LockoutState::default())?;
        Ok(reset.is_some())
    }
}

#[derive(Default)]
pub(crate) struct MockLoginHistoryRepository {
    entries: Mutex<Vec<LoginHistoryEntry>>,
}

impl MockLoginHistoryRepository {
    pub(crate) fn count_for(&self, account_id: &AccountId) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.account_id == account_id)
            .count()
    }
}

#[async_trait]
impl LoginHistoryRepository for MockLoginHistoryRepository {
    async fn append(&self, entry: LoginHistoryEntry) -> Result<LoginHistoryEntry, Error> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(entry)
    }

    async fn recent(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<LoginHistoryEntry>, Error> {
        let mut entries: Vec<_> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.account_id == account_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.logged_in_at.cmp(&a.logged_in_at));
        entries.truncate(limit);
        Ok(entries)
    }
}

#[derive(Default)]
pub(crate) struct MockSessionRepository {
    sessions: Mutex<HashMap<String, Session>>,
}

impl MockSessionRepository {
    pub(crate) fn stored_hashes(&self) -> Vec<String> {
        self.sessions.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.token_hash.clone(), session.clone());
        Ok(session)
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .get(&token.token_hash())
            .filter(|s| token.verify_hash(&s.token_hash))
            .cloned())
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        self.sessions.lock().unwrap().remove(&token.token_hash());
        Ok(())
    }

    async fn delete_by_account_id(&self, account_id: &AccountId) -> Result<(), Error> {
        self.sessions
            .lock()
            .unwrap()
            .retain(|_, s| &s.account_id != account_id);
        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<u64, Error> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - sessions.len()) as u64)
    }
}

/// Reversible "hash" that records how often verification ran.
#[derive(Default)]
pub(crate) struct CountingHasher {
    verifications: AtomicUsize,
}

impl CountingHasher {
    pub(crate) fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PasswordHasher for CountingHasher {
    async fn hash(&self, password: &str) -> Result<String, Error> {
        Ok(format!("plain:{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        // Give concurrent logins a chance to interleave between read and write.
        tokio::task::yield_now().await;
        Ok(hash.strip_prefix("plain:") == Some(password))
    }
}

pub(crate) fn account_with(email: &str, password: &str, lockout: LockoutState) -> Account {
    let now = Utc::now();
    Account {
        id: AccountId::new_random(),
        email: email.to_string(),
        name: Some("Test Account".to_string()),
        password_hash: format!("plain:{password}"),
        lockout,
        created_at: now,
        updated_at: now,
    }
}
