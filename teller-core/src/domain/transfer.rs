//! Transfer domain models

use serde::{Deserialize, Serialize};

use super::Identity;

/// Confirmation message returned after a completed transfer
pub const TRANSFER_COMPLETED: &str = "Transfer is completed";

/// A requested movement of funds out of the caller's account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferIntent {
    /// Source account number, taken from the verified identity
    pub from: i64,
    pub to: i64,
    pub amount: i64,
}

impl TransferIntent {
    pub fn new(identity: &Identity, to: i64, amount: i64) -> Self {
        Self {
            from: identity.account_number,
            to,
            amount,
        }
    }

    /// Check the intent before touching storage
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.amount <= 0 {
            return Err("amount must be a positive integer");
        }
        if self.from == self.to {
            return Err("cannot transfer to the same account");
        }
        Ok(())
    }
}

/// Result of a successful transfer (balances are deliberately not echoed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub message: String,
}

impl TransferReceipt {
    pub fn completed() -> Self {
        Self {
            message: TRANSFER_COMPLETED.to_string(),
        }
    }
}
