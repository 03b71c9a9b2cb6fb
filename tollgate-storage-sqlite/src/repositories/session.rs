use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tollgate_core::{
    Error, Session, account::AccountId, repositories::SessionRepository, session::SessionToken,
};

use crate::{database_error, from_timestamp};

pub struct SqliteSessionRepository {
    pool: SqlitePool,
}

impl SqliteSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct SqliteSession {
    token_hash: String,
    account_id: String,
    user_agent: Option<String>,
    ip_address: Option<String>,
    created_at: i64,
    expires_at: i64,
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn create(&self, session: Session) -> Result<Session, Error> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, account_id, user_agent, ip_address, created_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&session.token_hash)
        .bind(session.account_id.as_str())
        .bind(&session.user_agent)
        .bind(&session.ip_address)
        .bind(session.created_at.timestamp())
        .bind(session.expires_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(session)
    }

    async fn find_by_token(&self, token: &SessionToken) -> Result<Option<Session>, Error> {
        let row = sqlx::query_as::<_, SqliteSession>(
            "SELECT * FROM sessions WHERE token_hash = ?1",
        )
        .bind(token.token_hash())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        if !token.verify_hash(&row.token_hash) {
            return Ok(None);
        }

        Ok(Some(Session {
            token: token.clone(),
            token_hash: row.token_hash,
            account_id: AccountId::new(&row.account_id),
            user_agent: row.user_agent,
            ip_address: row.ip_address,
            created_at: from_timestamp("sessions.created_at", row.created_at)?,
            expires_at: from_timestamp("sessions.expires_at", row.expires_at)?,
        }))
    }

    async fn delete(&self, token: &SessionToken) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?1")
            .bind(token.token_hash())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn delete_by_account_id(&self, account_id: &AccountId) -> Result<(), Error> {
        sqlx::query("DELETE FROM sessions WHERE account_id = ?1")
            .bind(account_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn cleanup_expired(&self) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now().timestamp())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
