//! CLI command implementations

pub mod accounts;
pub mod credit;
pub mod delete;
pub mod migrate;
pub mod serve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teller_core::config::Config;
use teller_core::ports::AccountRepository;
use teller_core::TellerContext;

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TELLER_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".teller"))
}

/// Load configuration from the data directory
///
/// The signing secret is not required here; only commands that build a
/// [`TellerContext`] need it.
pub fn load_config() -> Result<(Config, PathBuf)> {
    let data_dir = get_data_dir()?;
    let config = Config::load(&data_dir)
        .with_context(|| format!("Failed to load configuration from {:?}", data_dir))?;
    Ok((config, data_dir))
}

/// Build a context from an already loaded config
pub async fn context_for(config: Config, data_dir: &std::path::Path) -> Result<TellerContext> {
    TellerContext::from_config(config, data_dir)
        .await
        .context("Failed to initialize teller context")
}

/// Get or create the teller context
pub async fn get_context() -> Result<TellerContext> {
    let (config, data_dir) = load_config()?;
    context_for(config, &data_dir).await
}

/// Open the configured repository with its schema in place, without
/// requiring a signing secret
pub async fn get_repository() -> Result<Arc<dyn AccountRepository>> {
    let (config, data_dir) = load_config()?;
    let repository = teller_core::open_repository(&config, &data_dir)?;
    repository
        .ensure_schema()
        .await
        .context("Failed to initialize storage schema")?;
    Ok(repository)
}
