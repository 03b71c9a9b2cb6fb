//! Stateless sessions carried entirely inside a signed JWT.

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::{
    Error, JwtConfig, Session, SessionToken,
    account::{AccountId, AccountProfile},
    history::ClientInfo,
};

use super::provider::SessionProvider;

pub struct JwtSessionProvider {
    config: JwtConfig,
}

impl JwtSessionProvider {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn create_session(
        &self,
        account: &AccountProfile,
        client: &ClientInfo,
        ttl: Duration,
    ) -> Result<Session, Error> {
        let session = Session::new(
            SessionToken::Jwt(String::new()),
            &account.id,
            client,
            Utc::now(),
            ttl,
        );

        let claims = session.to_jwt_claims(&account.email, self.config.issuer.clone());
        let token = SessionToken::new_jwt(&claims, &self.config)?;

        Ok(Session {
            token_hash: token.token_hash(),
            token,
            ..session
        })
    }

    async fn get_session(&self, token: &SessionToken) -> Result<Session, Error> {
        let claims = token.verify_jwt(&self.config)?;
        Ok(Session::from_jwt_claims(token.clone(), &claims))
    }

    async fn delete_session(&self, _token: &SessionToken) -> Result<(), Error> {
        tracing::warn!(
            "JWT sessions cannot be revoked; the token stays valid until it expires"
        );
        Ok(())
    }

    async fn delete_sessions_for_account(&self, account_id: &AccountId) -> Result<(), Error> {
        tracing::warn!(
            account_id = %account_id,
            "JwtSessionProvider cannot revoke all sessions for an account; tokens remain valid until they expire"
        );
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> Result<(), Error> {
        Ok(())
    }
}
