use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tollgate_core::{
    Error,
    account::{Account, AccountId, LockoutState, NewAccount},
    error::{AuthError, StorageError},
    repositories::AccountRepository,
};

use crate::{database_error, from_timestamp};

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteAccount {
    id: String,
    email: String,
    name: Option<String>,
    password_hash: String,
    failed_login_attempts: i64,
    is_locked: bool,
    locked_at: Option<i64>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteAccount> for Account {
    type Error = Error;

    fn try_from(row: SqliteAccount) -> Result<Self, Self::Error> {
        let locked_at = row
            .locked_at
            .map(|ts| from_timestamp("accounts.locked_at", ts))
            .transpose()?;
        let failed_login_attempts =
            u32::try_from(row.failed_login_attempts.max(0)).unwrap_or(u32::MAX);

        Ok(Account {
            id: AccountId::new(&row.id),
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            lockout: LockoutState::from_parts(failed_login_attempts, row.is_locked, locked_at),
            created_at: from_timestamp("accounts.created_at", row.created_at)?,
            updated_at: from_timestamp("accounts.updated_at", row.updated_at)?,
        })
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        let now = Utc::now().timestamp();

        let row = sqlx::query_as::<_, SqliteAccount>(
            r#"
            INSERT INTO accounts (id, email, name, password_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(&account.name)
        .bind(&account.password_hash)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Auth(AuthError::EmailAlreadyRegistered)
            }
            e => database_error(e),
        })?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn set_password_hash(&self, id: &AccountId, hash: &str) -> Result<(), Error> {
        let result =
            sqlx::query("UPDATE accounts SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
                .bind(hash)
                .bind(Utc::now().timestamp())
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound.into());
        }
        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        id: &AccountId,
        max_failed_attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<LockoutState>, Error> {
        // Right-hand sides read the row as it was before this update.
        let row = sqlx::query_as::<_, SqliteAccount>(
            r#"
            UPDATE accounts
            SET failed_login_attempts = failed_login_attempts + 1,
                is_locked = (is_locked OR failed_login_attempts + 1 >= ?1),
                locked_at = CASE
                    WHEN is_locked THEN COALESCE(locked_at, 0)
                    WHEN failed_login_attempts + 1 >= ?1 THEN ?2
                    ELSE NULL
                END,
                updated_at = ?2
            WHERE id = ?3
            RETURNING *
            "#,
        )
        .bind(i64::from(max_failed_attempts))
        .bind(now.timestamp())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.map(|row| Account::try_from(row).map(|account| account.lockout))
            .transpose()
    }

    async fn clear_expired_lock(
        &self,
        id: &AccountId,
        locked_before: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET failed_login_attempts = 0, is_locked = 0, locked_at = NULL, updated_at = ?1
            WHERE id = ?2 AND is_locked AND COALESCE(locked_at, 0) <= ?3
            "#,
        )
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .bind(locked_before.timestamp())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn reset_lockout(&self, id: &AccountId) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET failed_login_attempts = 0, is_locked = 0, locked_at = NULL, updated_at = ?1
            WHERE id = ?2
            "#,
        )
        .bind(Utc::now().timestamp())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(result.rows_affected() == 1)
    }
}
