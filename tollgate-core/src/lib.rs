//! Core types and services for tollgate
//!
//! This crate holds everything that does not depend on a particular storage
//! backend or HTTP framework: the account and session types, the lockout
//! policy, the repository traits storage backends implement, and the
//! services that combine them into the login, signup, password-change and
//! history flows.
//!
//! See [`LockoutPolicy`] for the lockout rules and [`services::LoginService`]
//! for the order in which a login is evaluated.
pub mod account;
pub mod crypto;
pub mod error;
pub mod history;
pub mod id;
pub mod lockout;
pub mod repositories;
pub mod request;
pub mod response;
pub mod services;
pub mod session;
pub mod validation;

pub use account::{Account, AccountId, AccountProfile, LockoutState, NewAccount};
pub use crypto::{Argon2PasswordHasher, PasswordHasher};
pub use error::{Error, ErrorKind};
pub use history::{ClientInfo, LoginHistoryEntry};
pub use lockout::{AttemptOutcome, LockoutDecision, LockoutPolicy};
pub use request::{ChangePasswordRequest, LoginRequest, SignupRequest};
pub use response::ApiResponse;
pub use session::{JwtConfig, Session, SessionToken};
