//! Accounts and their lockout state
//!
//! | Field                   | Type               | Description                                 |
//! | ----------------------- | ------------------ | ------------------------------------------- |
//! | `id`                    | `AccountId`        | Opaque prefixed id (`acc_...`).             |
//! | `email`                 | `String`           | Unique login email.                         |
//! | `name`                  | `Option<String>`   | Display name.                               |
//! | `password_hash`         | `String`           | Argon2 PHC string. Never serialised.        |
//! | `lockout`               | `LockoutState`     | Failed-attempt counter and lock timestamp.  |
//! | `created_at`            | `DateTime`         | When the account was created.               |
//! | `updated_at`            | `DateTime`         | When the account row last changed.          |

use crate::id::{generate_prefixed_id, validate_prefixed_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ACCOUNT_ID_PREFIX: &str = "acc";

/// A unique, stable identifier for an account. Treat the contents as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id(ACCOUNT_ID_PREFIX))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, ACCOUNT_ID_PREFIX)
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-account lockout bookkeeping.
///
/// `is_locked` implies `locked_at.is_some()`; use the constructors rather
/// than building the struct by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockoutState {
    pub failed_login_attempts: u32,
    pub is_locked: bool,
    pub locked_at: Option<DateTime<Utc>>,
}

impl LockoutState {
    pub fn open(failed_login_attempts: u32) -> Self {
        Self {
            failed_login_attempts,
            is_locked: false,
            locked_at: None,
        }
    }

    pub fn locked(failed_login_attempts: u32, locked_at: DateTime<Utc>) -> Self {
        Self {
            failed_login_attempts,
            is_locked: true,
            locked_at: Some(locked_at),
        }
    }

    /// Build from stored columns. A row claiming to be locked without a
    /// timestamp is treated as locked since the epoch, so the lock reads as
    /// expired on the next check and the row heals itself.
    pub fn from_parts(
        failed_login_attempts: u32,
        is_locked: bool,
        locked_at: Option<DateTime<Utc>>,
    ) -> Self {
        match (is_locked, locked_at) {
            (true, None) => Self::locked(failed_login_attempts, DateTime::UNIX_EPOCH),
            _ => Self {
                failed_login_attempts,
                is_locked,
                locked_at: if is_locked { locked_at } else { None },
            },
        }
    }

    pub fn is_clear(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub lockout: LockoutState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn profile(&self) -> AccountProfile {
        AccountProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }

    pub fn with_lockout(mut self, lockout: LockoutState) -> Self {
        self.lockout = lockout;
        self
    }
}

/// The only account shape ever returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
}

/// Insert payload for a freshly signed-up account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl NewAccount {
    pub fn new(email: impl Into<String>, name: Option<String>, password_hash: String) -> Self {
        Self {
            id: AccountId::new_random(),
            email: email.into(),
            name,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_format() {
        let id = AccountId::new_random();
        assert!(id.as_str().starts_with("acc_"));
        assert!(id.is_valid());
        assert!(!AccountId::new("usr_123").is_valid());
    }

    #[test]
    fn test_from_parts_keeps_invariant() {
        let healed = LockoutState::from_parts(5, true, None);
        assert!(healed.is_locked);
        assert_eq!(healed.locked_at, Some(DateTime::UNIX_EPOCH));

        let stale = LockoutState::from_parts(2, false, Some(Utc::now()));
        assert_eq!(stale, LockoutState::open(2));
    }

    #[test]
    fn test_profile_omits_credentials() {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new_random(),
            email: "jane@example.com".to_string(),
            name: Some("Jane".to_string()),
            password_hash: "secret-hash".to_string(),
            lockout: LockoutState::default(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(account.profile()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert!(!json.to_string().contains("secret-hash"));
    }
}
