//! In-memory repository implementation
//!
//! Used by tests and by `teller serve --in-memory`. All state lives behind one
//! mutex, so every operation (including both legs of `move_funds`) is atomic.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, NewAccount};
use crate::ports::AccountRepository;

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl State {
    fn find_by<P: Fn(&Account) -> bool>(&self, pred: P) -> Option<&Account> {
        self.accounts.values().find(|a| pred(a))
    }

    fn balance_of(&self, id: i64) -> Result<i64> {
        self.accounts
            .get(&id)
            .map(|a| a.balance)
            .ok_or_else(|| Error::not_found(format!("Account {} not found", id)))
    }
}

/// Repository backed by a process-local map
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: Mutex<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::storage("in-memory repository lock poisoned"))
    }
}

#[async_trait]
impl AccountRepository for InMemoryRepository {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account> {
        let mut state = self.lock()?;

        if state.find_by(|a| a.number == account.number).is_some() {
            return Err(Error::DuplicateAccountNumber(account.number));
        }
        if state.find_by(|a| a.email == account.email).is_some() {
            return Err(Error::conflict(format!(
                "Email {} is already registered",
                account.email
            )));
        }

        state.next_id += 1;
        let created = account.clone().into_account(state.next_id);
        state.accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.lock()?.accounts.values().cloned().collect())
    }

    async fn get_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self.lock()?.find_by(|a| a.email == email).cloned())
    }

    async fn get_account_by_number(&self, number: i64) -> Result<Option<Account>> {
        Ok(self.lock()?.find_by(|a| a.number == number).cloned())
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        Ok(self.lock()?.accounts.remove(&id).is_some())
    }

    async fn adjust_balance(&self, id: i64, delta: i64) -> Result<()> {
        let mut state = self.lock()?;
        let available = state.balance_of(id)?;

        let updated = available
            .checked_add(delta)
            .ok_or_else(|| Error::validation("balance overflow"))?;
        if updated < 0 {
            return Err(Error::InsufficientFunds {
                available,
                requested: -delta,
            });
        }

        if let Some(account) = state.accounts.get_mut(&id) {
            account.balance = updated;
        }
        Ok(())
    }

    async fn move_funds(&self, from_id: i64, to_id: i64, amount: i64) -> Result<()> {
        let mut state = self.lock()?;

        // Validate both legs before applying either
        let available = state.balance_of(from_id)?;
        let to_balance = state.balance_of(to_id)?;
        if available < amount {
            return Err(Error::InsufficientFunds {
                available,
                requested: amount,
            });
        }
        let credited = to_balance
            .checked_add(amount)
            .ok_or_else(|| Error::validation("balance overflow"))?;

        if let Some(from) = state.accounts.get_mut(&from_id) {
            from.balance = available - amount;
        }
        if let Some(to) = state.accounts.get_mut(&to_id) {
            to.balance = credited;
        }
        Ok(())
    }
}
