//! Request payloads accepted by the service operations.
//!
//! Field names are snake_case on the wire; the camelCase spellings used by
//! browser forms are accepted as aliases.

use crate::{
    error::ValidationError,
    validation::{
        validate_confirmation, validate_email, validate_name, validate_password_present,
        validate_password_strength,
    },
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password_present("Password", &self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

impl SignupRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_name(&self.name)?;
        validate_password_strength(&self.password)?;
        if let Some(confirmation) = &self.confirm_password {
            validate_confirmation(&self.password, confirmation)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    pub current_password: String,
    #[serde(alias = "newPassword")]
    pub new_password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl ChangePasswordRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_password_present("Current password", &self.current_password)?;
        validate_password_strength(&self.new_password)?;
        validate_confirmation(&self.new_password, &self.confirm_password)
    }

    /// Only meaningful once the current password has been verified.
    pub fn is_unchanged(&self) -> bool {
        self.new_password == self.current_password
    }
}
