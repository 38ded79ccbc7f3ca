//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod credentials;
mod identity;
pub mod result;
mod transfer;

pub use account::{generate_account_number, Account, NewAccount, Registration, ACCOUNT_NUMBER_RANGE};
pub use credentials::HashParams;
pub use identity::{Claims, Identity};
pub use transfer::{TransferIntent, TransferReceipt, TRANSFER_COMPLETED};
