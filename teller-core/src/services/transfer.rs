//! Transfer service - moves funds between accounts

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::result::{Error, Result};
use crate::domain::{Identity, TransferIntent, TransferReceipt};
use crate::ports::AccountRepository;

/// Transfer engine
///
/// The source account always comes from the caller's verified identity.
#[derive(Clone)]
pub struct TransferService {
    repository: Arc<dyn AccountRepository>,
}

impl TransferService {
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }

    /// Move `amount` from the caller's account to `to_account`
    pub async fn transfer(
        &self,
        caller: &Identity,
        to_account: i64,
        amount: i64,
    ) -> Result<TransferReceipt> {
        let intent = TransferIntent::new(caller, to_account, amount);
        intent.validate().map_err(Error::validation)?;

        let from = self
            .repository
            .get_account_by_number(intent.from)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Account number {} does not exist", intent.from))
            })?;

        let to = self
            .repository
            .get_account_by_number(intent.to)
            .await?
            .ok_or_else(|| {
                Error::not_found(format!("Account number {} does not exist", intent.to))
            })?;

        if from.balance < intent.amount {
            warn!(from = from.number, amount = intent.amount, "insufficient funds");
            return Err(Error::InsufficientFunds {
                available: from.balance,
                requested: intent.amount,
            });
        }

        // Sufficiency is checked again inside the atomic move; the read above
        // may already be stale.
        self.repository
            .move_funds(from.id, to.id, intent.amount)
            .await
            .map_err(|e| {
                warn!(from = from.number, to = to.number, error = %e, "transfer rejected");
                e
            })?;

        info!(from = from.number, to = to.number, amount = intent.amount, "transfer completed");
        Ok(TransferReceipt::completed())
    }
}
