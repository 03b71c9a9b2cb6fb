//! Password hashing and session-token hashing
//!
//! Passwords go through Argon2 (via `password-auth`) behind the
//! [`PasswordHasher`] trait. Opaque session tokens carry 256 bits of
//! randomness, so they are stored as a plain SHA-256 digest and compared in
//! constant time.

use crate::error::{CryptoError, Error};
use async_trait::async_trait;
use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// One-way password hashing.
#[async_trait]
pub trait PasswordHasher: Send + Sync + 'static {
    async fn hash(&self, password: &str) -> Result<String, Error>;

    /// Returns `Ok(false)` for a mismatch; `Err` only when the stored hash
    /// itself is unusable.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, Error>;
}

/// Argon2id hashing. Work runs on the blocking pool so a burst of logins
/// does not stall the async workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, Error> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || password_auth::generate_hash(password))
            .await
            .map_err(|e| CryptoError::PasswordHash(e.to_string()).into())
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let outcome =
            tokio::task::spawn_blocking(move || password_auth::verify_password(password, &hash))
                .await
                .map_err(|e| CryptoError::PasswordHash(e.to_string()))?;

        match outcome {
            Ok(()) => Ok(true),
            Err(password_auth::VerifyError::PasswordInvalid) => Ok(false),
            Err(e) => {
                tracing::error!(error = %e, "Stored password hash could not be parsed");
                Err(CryptoError::PasswordHash(e.to_string()).into())
            }
        }
    }
}

/// 256-bit random token, URL-safe base64 (43 characters).
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex-encoded SHA-256 of `token`, used as the storage key for sessions.
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    constant_time_compare(hash_token(token).as_bytes(), stored_hash.as_bytes())
}

pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
