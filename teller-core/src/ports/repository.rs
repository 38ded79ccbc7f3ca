//! Repository port - account storage abstraction

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::{Account, NewAccount};

/// Account storage abstraction
///
/// Balances change only through [`AccountRepository::adjust_balance`] and
/// [`AccountRepository::move_funds`]; both are atomic with respect to every
/// other call on the same repository.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Prepare the backing store (run migrations, create tables)
    async fn ensure_schema(&self) -> Result<()>;

    // === Accounts ===

    /// Persist a new account with a zero balance
    ///
    /// Fails with `Error::DuplicateAccountNumber` when the number is taken and
    /// with `Error::Conflict` when the email is already registered.
    async fn create_account(&self, account: &NewAccount) -> Result<Account>;

    /// Get all accounts, ordered by id
    async fn get_accounts(&self) -> Result<Vec<Account>>;

    /// Get account by surrogate id
    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>>;

    /// Get account by (normalized) email
    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Get account by public account number
    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>>;

    /// Delete an account, returning whether a row was removed
    async fn delete_account(&self, id: i64) -> Result<bool>;

    // === Balances ===

    /// Atomically apply `balance = balance + delta`
    ///
    /// A delta that would take the balance below zero is rejected with
    /// `Error::InsufficientFunds` and nothing is applied.
    async fn adjust_balance(&self, id: i64, delta: i64) -> Result<()>;

    /// Atomically debit `from_id` and credit `to_id` by `amount`
    ///
    /// The sufficiency check runs inside the same atomic scope as the debit.
    /// Either both legs apply or neither does.
    async fn move_funds(&self, from_id: i64, to_id: i64, amount: i64) -> Result<()>;
}
