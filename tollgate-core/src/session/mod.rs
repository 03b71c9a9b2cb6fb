//! Sessions issued on successful login
//!
//! | Field        | Type             | Description                                           |
//! | ------------ | ---------------- | ----------------------------------------------------- |
//! | `token`      | `SessionToken`   | Plaintext token handed to the client.                 |
//! | `token_hash` | `String`         | SHA-256 of the token; the only form that is stored.   |
//! | `account_id` | `AccountId`      | Owner of the session.                                 |
//! | `user_agent` | `Option<String>` | User agent of the client that logged in.              |
//! | `ip_address` | `Option<String>` | IP address of the client that logged in.              |
//! | `created_at` | `DateTime`       | When the session was issued.                          |
//! | `expires_at` | `DateTime`       | When the session stops being accepted.                |

pub mod jwt;
pub mod opaque;
pub mod provider;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    account::AccountId,
    crypto::{generate_secure_token, hash_token, verify_token_hash},
    error::{CryptoError, SessionError, ValidationError},
    history::ClientInfo,
};

pub use jwt::JwtSessionProvider;
pub use opaque::OpaqueSessionProvider;
pub use provider::SessionProvider;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 180;

/// Either a random opaque token looked up in storage, or a self-contained JWT.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SessionToken {
    Opaque(String),
    Jwt(String),
}

impl SessionToken {
    /// Classify a token received from a client. Anything with three
    /// dot-separated segments is treated as a JWT.
    pub fn new(token: &str) -> Self {
        if token.chars().filter(|&c| c == '.').count() == 2 {
            SessionToken::Jwt(token.to_string())
        } else {
            SessionToken::Opaque(token.to_string())
        }
    }

    pub fn new_random() -> Self {
        SessionToken::Opaque(generate_secure_token())
    }

    pub fn new_jwt(claims: &JwtClaims, config: &JwtConfig) -> Result<Self, Error> {
        let header = Header::new(config.jwt_algorithm());
        let encoding_key = config.get_encoding_key()?;

        let token = encode(&header, claims, &encoding_key)
            .map_err(|e| CryptoError::JwtSigning(e.to_string()))?;

        Ok(SessionToken::Jwt(token))
    }

    pub fn verify_jwt(&self, config: &JwtConfig) -> Result<JwtClaims, Error> {
        let SessionToken::Jwt(token) = self else {
            return Err(SessionError::InvalidToken("Not a JWT token".to_string()).into());
        };

        let decoding_key = config.get_decoding_key()?;
        decode::<JwtClaims>(token, &decoding_key, &config.get_validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired.into(),
                _ => SessionError::InvalidToken(format!("JWT validation failed: {e}")).into(),
            })
    }

    pub fn token_hash(&self) -> String {
        hash_token(self.as_str())
    }

    pub fn verify_hash(&self, stored_hash: &str) -> bool {
        verify_token_hash(self.as_str(), stored_hash)
    }

    pub fn into_inner(self) -> String {
        match self {
            SessionToken::Opaque(token) | SessionToken::Jwt(token) => token,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionToken::Opaque(token) | SessionToken::Jwt(token) => token,
        }
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for SessionToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// Tokens are bearer credentials; keep them out of logs.
impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionToken::Opaque(_) => f.write_str("SessionToken::Opaque(..)"),
            SessionToken::Jwt(_) => f.write_str("SessionToken::Jwt(..)"),
        }
    }
}

/// Claims carried by a session JWT.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Account id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

#[derive(Debug, Clone)]
pub enum JwtAlgorithm {
    /// RSA with SHA-256, PEM-encoded keys
    RS256 {
        private_key: Vec<u8>,
        public_key: Vec<u8>,
    },
    /// HMAC with SHA-256
    HS256 { secret_key: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub algorithm: JwtAlgorithm,
    pub issuer: Option<String>,
}

impl JwtConfig {
    pub fn new_rs256(private_key: Vec<u8>, public_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::RS256 {
                private_key,
                public_key,
            },
            issuer: None,
        }
    }

    pub fn new_hs256(secret_key: Vec<u8>) -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256 { secret_key },
            issuer: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn jwt_algorithm(&self) -> Algorithm {
        match &self.algorithm {
            JwtAlgorithm::RS256 { .. } => Algorithm::RS256,
            JwtAlgorithm::HS256 { .. } => Algorithm::HS256,
        }
    }

    pub fn get_encoding_key(&self) -> Result<EncodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { private_key, .. } => EncodingKey::from_rsa_pem(private_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA private key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(EncodingKey::from_secret(secret_key)),
        }
    }

    pub fn get_decoding_key(&self) -> Result<DecodingKey, Error> {
        match &self.algorithm {
            JwtAlgorithm::RS256 { public_key, .. } => DecodingKey::from_rsa_pem(public_key)
                .map_err(|e| {
                    ValidationError::InvalidField(format!("Invalid RSA public key: {e}")).into()
                }),
            JwtAlgorithm::HS256 { secret_key } => Ok(DecodingKey::from_secret(secret_key)),
        }
    }

    pub fn get_validation(&self) -> Validation {
        let mut validation = Validation::new(self.jwt_algorithm());
        validation.leeway = 0;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub token_hash: String,
    pub account_id: AccountId,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        token: SessionToken,
        account_id: &AccountId,
        client: &ClientInfo,
        created_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            token_hash: token.token_hash(),
            token,
            account_id: account_id.clone(),
            user_agent: client.user_agent.clone(),
            ip_address: client.ip_address.clone(),
            created_at,
            expires_at: created_at + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn to_jwt_claims(&self, email: &str, issuer: Option<String>) -> JwtClaims {
        JwtClaims {
            sub: self.account_id.to_string(),
            email: email.to_string(),
            iat: self.created_at.timestamp(),
            exp: self.expires_at.timestamp(),
            iss: issuer,
        }
    }

    pub fn from_jwt_claims(token: SessionToken, claims: &JwtClaims) -> Self {
        let now = Utc::now();
        Self {
            token_hash: token.token_hash(),
            token,
            account_id: AccountId::new(&claims.sub),
            user_agent: None,
            ip_address: None,
            created_at: DateTime::from_timestamp(claims.iat, 0).unwrap_or(now),
            expires_at: DateTime::from_timestamp(claims.exp, 0).unwrap_or(now),
        }
    }
}
