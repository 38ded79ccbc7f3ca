//! Services - business logic layer

mod account;
mod auth;
mod credentials;
pub mod migration;
pub mod token;
mod transfer;

pub use account::{AccountService, CreatedAccount};
pub use auth::{bearer_token, AuthorizationGate, BEARER_SCHEME};
pub use credentials::CredentialService;
pub use migration::{MigrationResult, MigrationService};
pub use token::{TokenService, DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
pub use transfer::TransferService;
