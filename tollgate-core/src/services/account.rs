use crate::{
    Error,
    account::{AccountId, AccountProfile, NewAccount},
    crypto::PasswordHasher,
    error::{AuthError, ValidationError},
    repositories::AccountRepository,
    request::{ChangePasswordRequest, SignupRequest},
};
use std::sync::Arc;

/// Signup, password change and profile lookup
pub struct AccountService<A: AccountRepository> {
    repository: Arc<A>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<A: AccountRepository> AccountService<A> {
    pub fn new(repository: Arc<A>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { repository, hasher }
    }

    /// Register a new account.
    ///
    /// A taken email is reported as `AuthError::EmailAlreadyRegistered`. The
    /// storage layer enforces uniqueness as well, so two concurrent signups
    /// for one email cannot both succeed.
    pub async fn signup(&self, request: &SignupRequest) -> Result<AccountProfile, Error> {
        request.validate()?;

        if self
            .repository
            .find_by_email(&request.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let account = self
            .repository
            .create(NewAccount::new(
                request.email.clone(),
                Some(request.name.trim().to_string()),
                password_hash,
            ))
            .await?;

        tracing::info!(account_id = %account.id, "Account created");
        Ok(account.profile())
    }

    pub async fn change_password(
        &self,
        account_id: &AccountId,
        request: &ChangePasswordRequest,
    ) -> Result<(), Error> {
        request.validate()?;

        let account = self
            .repository
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if !self
            .hasher
            .verify(&request.current_password, &account.password_hash)
            .await?
        {
            return Err(AuthError::IncorrectCurrentPassword.into());
        }

        if request.is_unchanged() {
            return Err(ValidationError::PasswordUnchanged.into());
        }

        let password_hash = self.hasher.hash(&request.new_password).await?;
        self.repository
            .set_password_hash(account_id, &password_hash)
            .await?;

        tracing::info!(account_id = %account_id, "Password changed");
        Ok(())
    }

    pub async fn profile(&self, account_id: &AccountId) -> Result<Option<AccountProfile>, Error> {
        Ok(self
            .repository
            .find_by_id(account_id)
            .await?
            .map(|account| account.profile()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        account::LockoutState,
        services::test_support::{CountingHasher, MockAccountRepository, account_with},
    };

    fn service() -> (Arc<MockAccountRepository>, AccountService<MockAccountRepository>) {
        let repository = Arc::new(MockAccountRepository::default());
        let service = AccountService::new(repository.clone(), Arc::new(CountingHasher::default()));
        (repository, service)
    }

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: "Passw0rd".to_string(),
            name: "Jane".to_string(),
            confirm_password: Some("Passw0rd".to_string()),
        }
    }

    fn change_request(current: &str, new: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
            confirm_password: new.to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_creates_clear_account() {
        let (repository, service) = service();

        let profile = service.signup(&signup_request("jane@example.com")).await.unwrap();
        assert_eq!(profile.email, "jane@example.com");
        assert_eq!(profile.name.as_deref(), Some("Jane"));

        let stored = repository.get(&profile.id);
        assert!(stored.lockout.is_clear());
        assert_ne!(stored.password_hash, "Passw0rd");
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_email() {
        let (_, service) = service();
        service.signup(&signup_request("jane@example.com")).await.unwrap();

        let result = service.signup(&signup_request("jane@example.com")).await;
        assert!(matches!(
            result,
            Err(Error::Auth(AuthError::EmailAlreadyRegistered))
        ));
    }

    #[tokio::test]
    async fn test_signup_rejects_weak_password() {
        let (_, service) = service();
        let mut request = signup_request("jane@example.com");
        request.password = "password".to_string();
        request.confirm_password = None;

        let result = service.signup(&request).await;
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidPassword(_)))
        ));
    }

    #[tokio::test]
    async fn test_change_password() {
        let (repository, service) = service();
        let account = account_with("jane@example.com", "Old1pass", LockoutState::default());
        repository.insert(account.clone());

        service
            .change_password(&account.id, &change_request("Old1pass", "New1pass"))
            .await
            .unwrap();
        assert_eq!(repository.get(&account.id).password_hash, "plain:New1pass");
    }

    #[tokio::test]
    async fn test_change_password_failures() {
        let (repository, service) = service();
        let account = account_with("jane@example.com", "Old1pass", LockoutState::default());
        repository.insert(account.clone());

        let missing = service
            .change_password(&AccountId::new_random(), &change_request("Old1pass", "New1pass"))
            .await;
        assert!(matches!(missing, Err(Error::Auth(AuthError::AccountNotFound))));

        let wrong = service
            .change_password(&account.id, &change_request("Wrong1pass", "New1pass"))
            .await;
        assert!(matches!(
            wrong,
            Err(Error::Auth(AuthError::IncorrectCurrentPassword))
        ));

        let unchanged = service
            .change_password(&account.id, &change_request("Old1pass", "Old1pass"))
            .await;
        assert!(matches!(
            unchanged,
            Err(Error::Validation(ValidationError::PasswordUnchanged))
        ));

        assert_eq!(repository.get(&account.id).password_hash, "plain:Old1pass");
    }

    #[tokio::test]
    async fn test_profile() {
        let (repository, service) = service();
        let account = account_with("jane@example.com", "Old1pass", LockoutState::default());
        repository.insert(account.clone());

        let profile = service.profile(&account.id).await.unwrap().unwrap();
        assert_eq!(profile, account.profile());
        assert!(service.profile(&AccountId::new_random()).await.unwrap().is_none());
    }
}
