use thiserror::Error;

/// Message shared by "unknown email" and "wrong password" so the two cases
/// cannot be told apart by a client.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Email or password is incorrect.";

/// Message returned for every failure that is not the caller's fault.
pub const SERVER_ERROR_MESSAGE: &str = "A server error occurred.";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account locked for another {remaining_minutes} minute(s)")]
    AccountLocked { remaining_minutes: i64 },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,

    #[error("Session expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("New password must differ from the current password")]
    PasswordUnchanged,

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("JWT signing failed: {0}")]
    JwtSigning(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Coarse classification of an [`Error`], used to pick the response status
/// and the message a client is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Lockout,
    NotAuthenticated,
    Conflict,
    NotFound,
    BadRequest,
    Server,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Auth(AuthError::InvalidCredentials) => ErrorKind::Authentication,
            Error::Auth(AuthError::AccountLocked { .. }) => ErrorKind::Lockout,
            Error::Auth(AuthError::NotAuthenticated) | Error::Session(_) => {
                ErrorKind::NotAuthenticated
            }
            Error::Auth(AuthError::EmailAlreadyRegistered) => ErrorKind::Conflict,
            Error::Auth(AuthError::AccountNotFound) => ErrorKind::NotFound,
            Error::Auth(AuthError::IncorrectCurrentPassword) => ErrorKind::BadRequest,
            Error::Storage(_) | Error::Crypto(_) => ErrorKind::Server,
        }
    }

    /// The message that may be shown to the client.
    ///
    /// Server-side failures collapse to [`SERVER_ERROR_MESSAGE`]; their detail
    /// belongs in the logs only.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(e) => e.to_string(),
            Error::Auth(AuthError::InvalidCredentials) => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Error::Auth(AuthError::AccountLocked { remaining_minutes }) => format!(
                "Account is locked. Try again in about {remaining_minutes} minute(s)."
            ),
            Error::Auth(AuthError::NotAuthenticated) | Error::Session(_) => {
                "Not authenticated.".to_string()
            }
            Error::Auth(AuthError::EmailAlreadyRegistered) => {
                "Email is already registered.".to_string()
            }
            Error::Auth(AuthError::AccountNotFound) => "Account not found.".to_string(),
            Error::Auth(AuthError::IncorrectCurrentPassword) => {
                "Current password is incorrect.".to_string()
            }
            Error::Storage(_) | Error::Crypto(_) => SERVER_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.kind() == ErrorKind::Server
    }
}
