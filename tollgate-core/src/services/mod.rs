//! Service layer
//!
//! Services hold the login flow's business rules and talk to storage only
//! through the repository traits.

pub mod account;
pub mod history;
pub mod lockout;
pub mod login;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use account::AccountService;
pub use history::LoginHistoryService;
pub use lockout::LockoutService;
pub use login::{LoginOutcome, LoginService};
pub use session::SessionService;
