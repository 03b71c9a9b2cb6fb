//! Repository traits for the data access layer
//!
//! # Trait Hierarchy
//!
//! - Individual `*Repository` traits define the operations for each table
//! - Individual `*RepositoryProvider` traits hand out each repository
//! - [`RepositoryProvider`] combines the providers with lifecycle methods
//!
//! Services are generic over the individual repository traits; the
//! `*Adapter` types let a single `Arc<RepositoryProvider>` back all of them.

pub mod account;
pub mod adapter;
pub mod history;
pub mod session;

pub use account::AccountRepository;
pub use adapter::{
    AccountRepositoryAdapter, LoginHistoryRepositoryAdapter, SessionRepositoryAdapter,
};
pub use history::LoginHistoryRepository;
pub use session::SessionRepository;

use async_trait::async_trait;

use crate::Error;

pub trait AccountRepositoryProvider: Send + Sync + 'static {
    type AccountRepo: AccountRepository;

    fn account(&self) -> &Self::AccountRepo;
}

pub trait LoginHistoryRepositoryProvider: Send + Sync + 'static {
    type LoginHistoryRepo: LoginHistoryRepository;

    fn login_history(&self) -> &Self::LoginHistoryRepo;
}

pub trait SessionRepositoryProvider: Send + Sync + 'static {
    type SessionRepo: SessionRepository;

    fn session(&self) -> &Self::SessionRepo;
}

/// Provider trait that storage backends implement to expose every repository.
///
/// ```rust,ignore
/// use tollgate_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl AccountRepositoryProvider for MyStorage {
///     type AccountRepo = MyAccountRepository;
///     fn account(&self) -> &Self::AccountRepo { &self.accounts }
/// }
///
/// // ... the other provider traits ...
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider:
    AccountRepositoryProvider + LoginHistoryRepositoryProvider + SessionRepositoryProvider
{
    /// Bring the schema up to date
    async fn migrate(&self) -> Result<(), Error>;

    /// Cheap round-trip to the backing store
    async fn health_check(&self) -> Result<(), Error>;
}
