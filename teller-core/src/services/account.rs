//! Account service - registration, login and account administration

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::result::{AuthFailure, Error, Result};
use crate::domain::{Account, NewAccount, Registration};
use crate::ports::AccountRepository;
use crate::services::{CredentialService, TokenService};

/// Attempts at drawing an unused account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// A freshly registered account together with its first token
#[derive(Debug, Clone, Serialize)]
pub struct CreatedAccount {
    pub account: Account,
    pub token: String,
}

/// Account lifecycle operations
#[derive(Clone)]
pub struct AccountService {
    repository: Arc<dyn AccountRepository>,
    credentials: CredentialService,
    tokens: Arc<TokenService>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepository>,
        credentials: CredentialService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            repository,
            credentials,
            tokens,
        }
    }

    /// Register a new account and issue a token for it
    pub async fn create(&self, registration: Registration) -> Result<CreatedAccount> {
        registration.validate().map_err(Error::validation)?;

        if self.get_by_email(&registration.email).await?.is_some() {
            let email = Registration::normalize_email(&registration.email);
            return Err(Error::conflict(format!("Email {} is already registered", email)));
        }

        let password_hash = self.hash_off_thread(registration.password.clone()).await?;
        let mut record = NewAccount::new(&registration, password_hash);

        let mut attempt = 1;
        let account = loop {
            match self.repository.create_account(&record).await {
                Ok(account) => break account,
                Err(Error::DuplicateAccountNumber(number)) if attempt < MAX_NUMBER_ATTEMPTS => {
                    debug!(number, attempt, "account number collision, regenerating");
                    record.renumber();
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        let token = self.tokens.issue(account.number)?;
        info!(id = account.id, number = account.number, "account created");

        Ok(CreatedAccount { account, token })
    }

    /// Exchange email and password for a token
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let Some(account) = self.get_by_email(email).await? else {
            warn!("login for unknown email");
            return Err(Error::Auth(AuthFailure::InvalidCredentials));
        };

        let credentials = self.credentials.clone();
        let stored = account.password_hash.clone();
        let candidate = password.to_string();
        let matches =
            tokio::task::spawn_blocking(move || credentials.verify(&stored, &candidate)).await??;

        if !matches {
            warn!(number = account.number, "login with wrong password");
            return Err(Error::Auth(AuthFailure::InvalidCredentials));
        }

        self.tokens.issue(account.number)
    }

    pub async fn list(&self) -> Result<Vec<Account>> {
        self.repository.get_accounts().await
    }

    pub async fn get(&self, id: i64) -> Result<Account> {
        self.repository
            .get_account_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Account {} not found", id)))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = Registration::normalize_email(email);
        self.repository.get_account_by_email(&email).await
    }

    pub async fn get_by_number(&self, number: i64) -> Result<Option<Account>> {
        self.repository.get_account_by_number(number).await
    }

    /// Delete an account by storage id
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repository.delete_account(id).await? {
            return Err(Error::not_found(format!("Account {} not found", id)));
        }
        info!(id, "account deleted");
        Ok(())
    }

    /// Add funds to an account (operator deposit)
    pub async fn credit(&self, number: i64, amount: i64) -> Result<Account> {
        if amount <= 0 {
            return Err(Error::validation("amount must be a positive integer"));
        }
        let account = self.get_by_number(number).await?.ok_or_else(|| {
            Error::not_found(format!("Account number {} does not exist", number))
        })?;

        self.repository.adjust_balance(account.id, amount).await?;
        info!(number, amount, "account credited");

        self.get(account.id).await
    }

    async fn hash_off_thread(&self, password: String) -> Result<String> {
        let credentials = self.credentials.clone();
        tokio::task::spawn_blocking(move || credentials.hash(&password)).await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRepository;
    use crate::domain::HashParams;

    fn service() -> AccountService {
        let tokens = Arc::new(TokenService::new("account-secret", 3600).unwrap());
        AccountService::new(
            Arc::new(InMemoryRepository::new()),
            CredentialService::new(HashParams::minimal()),
            tokens,
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: "cobol-1959".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_login() {
        let service = service();
        let created = service.create(registration("grace@example.com")).await.unwrap();

        assert_eq!(created.account.balance, 0);
        assert_ne!(created.account.password_hash, "cobol-1959");
        assert!(created.account.password_hash.starts_with("$argon2id$"));

        let token = service.login("GRACE@example.com", "cobol-1959").await.unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service();
        service.create(registration("grace@example.com")).await.unwrap();

        let err = service.create(registration(" Grace@Example.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn test_invalid_registration() {
        let service = service();
        let mut reg = registration("grace@example.com");
        reg.password = "short".to_string();

        let err = service.create(reg).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let service = service();
        service.create(registration("grace@example.com")).await.unwrap();

        let wrong_password = service.login("grace@example.com", "fortran-57").await.unwrap_err();
        let unknown_email = service.login("nobody@example.com", "cobol-1959").await.unwrap_err();

        assert!(matches!(wrong_password, Error::Auth(AuthFailure::InvalidCredentials)));
        assert!(matches!(unknown_email, Error::Auth(AuthFailure::InvalidCredentials)));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let service = service();
        let created = service.create(registration("grace@example.com")).await.unwrap();
        let id = created.account.id;

        assert_eq!(service.get(id).await.unwrap().email, "grace@example.com");
        service.delete(id).await.unwrap();

        assert!(matches!(service.get(id).await, Err(Error::NotFound(_))));
        assert!(matches!(service.delete(id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_credit() {
        let service = service();
        let created = service.create(registration("grace@example.com")).await.unwrap();
        let number = created.account.number;

        let account = service.credit(number, 250).await.unwrap();
        assert_eq!(account.balance, 250);

        assert!(matches!(service.credit(number, 0).await, Err(Error::Validation(_))));
        assert!(matches!(service.credit(number + 1, 5).await, Err(Error::NotFound(_))));
    }
}
