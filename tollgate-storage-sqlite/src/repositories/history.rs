use async_trait::async_trait;
use sqlx::SqlitePool;
use tollgate_core::{
    Error, account::AccountId, history::LoginHistoryEntry, repositories::LoginHistoryRepository,
};

use crate::{database_error, from_timestamp};

pub struct SqliteLoginHistoryRepository {
    pool: SqlitePool,
}

impl SqliteLoginHistoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteLoginHistoryEntry {
    id: String,
    account_id: String,
    logged_in_at: i64,
    ip_address: Option<String>,
    user_agent: Option<String>,
}

impl TryFrom<SqliteLoginHistoryEntry> for LoginHistoryEntry {
    type Error = Error;

    fn try_from(row: SqliteLoginHistoryEntry) -> Result<Self, Self::Error> {
        Ok(LoginHistoryEntry {
            id: row.id,
            account_id: AccountId::new(&row.account_id),
            logged_in_at: from_timestamp("login_history.logged_in_at", row.logged_in_at)?,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
        })
    }
}

#[async_trait]
impl LoginHistoryRepository for SqliteLoginHistoryRepository {
    async fn append(&self, entry: LoginHistoryEntry) -> Result<LoginHistoryEntry, Error> {
        sqlx::query(
            r#"
            INSERT INTO login_history (id, account_id, logged_in_at, ip_address, user_agent)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(entry.account_id.as_str())
        .bind(entry.logged_in_at.timestamp())
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(entry)
    }

    async fn recent(
        &self,
        account_id: &AccountId,
        limit: usize,
    ) -> Result<Vec<LoginHistoryEntry>, Error> {
        // rowid breaks ties between logins in the same second
        let rows = sqlx::query_as::<_, SqliteLoginHistoryEntry>(
            r#"
            SELECT id, account_id, logged_in_at, ip_address, user_agent
            FROM login_history
            WHERE account_id = ?1
            ORDER BY logged_in_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )
        .bind(account_id.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.into_iter().map(LoginHistoryEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_provider;
    use chrono::{Duration, Utc};
    use tollgate_core::{
        account::NewAccount,
        history::ClientInfo,
        repositories::{AccountRepository, AccountRepositoryProvider, LoginHistoryRepositoryProvider},
    };

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let provider = setup_provider().await;
        let account = provider
            .account()
            .create(NewAccount::new("jane@example.com", None, "hash".to_string()))
            .await
            .unwrap();
        let client = ClientInfo::new(Some("203.0.113.9".to_string()), Some("curl/8".to_string()));
        let start = Utc::now() - Duration::hours(1);

        for minute in 0..25 {
            provider
                .login_history()
                .append(LoginHistoryEntry::new(
                    &account.id,
                    &client,
                    start + Duration::minutes(minute),
                ))
                .await
                .unwrap();
        }

        let recent = provider.login_history().recent(&account.id, 20).await.unwrap();
        assert_eq!(recent.len(), 20);
        assert!(recent.windows(2).all(|w| w[0].logged_in_at >= w[1].logged_in_at));
        assert_eq!(
            recent[0].logged_in_at.timestamp(),
            (start + Duration::minutes(24)).timestamp()
        );
        assert_eq!(recent[0].ip_address.as_deref(), Some("203.0.113.9"));
        assert_eq!(recent[0].user_agent.as_deref(), Some("curl/8"));
    }

    #[tokio::test]
    async fn test_recent_is_scoped_to_account() {
        let provider = setup_provider().await;
        let accounts = provider.account();
        let jane = accounts
            .create(NewAccount::new("jane@example.com", None, "hash".to_string()))
            .await
            .unwrap();
        let john = accounts
            .create(NewAccount::new("john@example.com", None, "hash".to_string()))
            .await
            .unwrap();

        provider
            .login_history()
            .append(LoginHistoryEntry::new(&jane.id, &ClientInfo::default(), Utc::now()))
            .await
            .unwrap();

        assert_eq!(provider.login_history().recent(&jane.id, 20).await.unwrap().len(), 1);
        assert!(provider.login_history().recent(&john.id, 20).await.unwrap().is_empty());
    }
}
