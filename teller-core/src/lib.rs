//! Teller Core - accounts, credentials and transfers for a small banking backend
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: Core entities (Account, Identity, TransferIntent, errors)
//! - **ports**: Trait definitions for external dependencies (AccountRepository)
//! - **services**: Business logic (accounts, tokens, authorization, transfers)
//! - **adapters**: Concrete implementations (DuckDB, in-memory)
//! - **api**: HTTP transport (axum router, extractors, error envelope)

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use adapters::{DuckDbRepository, InMemoryRepository};
use config::{Config, DATABASE_FILE};
use ports::AccountRepository;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{AuthFailure, Error};
pub use domain::{Account, Identity, Registration, TransferReceipt};

/// Main context for Teller operations
///
/// Holds the configuration, the repository and every service. The HTTP layer
/// shares it behind an `Arc`.
pub struct TellerContext {
    pub config: Config,
    pub repository: Arc<dyn AccountRepository>,
    pub account_service: AccountService,
    pub transfer_service: TransferService,
    pub auth_gate: AuthorizationGate,
}

impl TellerContext {
    /// Create a context from the settings and database in `data_dir`
    pub async fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::from_config(config, data_dir).await
    }

    /// Create a context from an already loaded config
    pub async fn from_config(config: Config, data_dir: &Path) -> Result<Self> {
        config.validate()?;
        let repository = open_repository(&config, data_dir)?;
        Self::with_repository(config, repository).await
    }

    /// Create a context around an existing repository
    pub async fn with_repository(
        config: Config,
        repository: Arc<dyn AccountRepository>,
    ) -> Result<Self> {
        config.validate()?;
        repository
            .ensure_schema()
            .await
            .context("failed to initialize storage schema")?;

        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_secs,
        )?);
        let credentials = CredentialService::new(config.hashing);

        let account_service =
            AccountService::new(Arc::clone(&repository), credentials, Arc::clone(&tokens));
        let transfer_service = TransferService::new(Arc::clone(&repository));
        let auth_gate = AuthorizationGate::new(tokens);

        Ok(Self {
            config,
            repository,
            account_service,
            transfer_service,
            auth_gate,
        })
    }
}

/// Open the repository selected by `config` (DuckDB under `data_dir`, or
/// in-memory). The schema is not touched.
pub fn open_repository(config: &Config, data_dir: &Path) -> Result<Arc<dyn AccountRepository>> {
    if config.storage.in_memory {
        info!("using in-memory storage");
        return Ok(Arc::new(InMemoryRepository::new()));
    }

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    let db_path = data_dir.join(DATABASE_FILE);
    info!(path = %db_path.display(), "opening database");
    Ok(Arc::new(DuckDbRepository::new(&db_path)?))
}
