//! Migrate command - apply pending schema migrations

use anyhow::{bail, Result};
use serde_json::json;

use teller_core::adapters::DuckDbRepository;
use teller_core::config::DATABASE_FILE;

use super::load_config;
use crate::output::{info, success};

pub async fn run(dry_run: bool, json: bool) -> Result<()> {
    let (config, data_dir) = load_config()?;
    if config.storage.in_memory {
        bail!("Storage is configured in-memory; there is nothing to migrate");
    }

    std::fs::create_dir_all(&data_dir)?;
    let repository = DuckDbRepository::new(&data_dir.join(DATABASE_FILE))?;
    let database = repository
        .db_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    if dry_run {
        let pending = repository.pending_migrations().await?;
        if json {
            let value = json!({ "database": database, "pending": pending });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else if pending.is_empty() {
            info(&format!("{}: schema up to date", database));
        } else {
            info(&format!("{}: {} pending migration(s)", database, pending.len()));
            for name in &pending {
                println!("  {}", name);
            }
        }
        return Ok(());
    }

    let result = repository.run_migrations().await?;

    if json {
        let value = json!({
            "database": database,
            "applied": result.applied,
            "alreadyApplied": result.already_applied,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if result.applied.is_empty() {
        info(&format!(
            "{}: schema up to date ({} migrations)",
            database, result.already_applied
        ));
    } else {
        for name in &result.applied {
            println!("  applied {}", name);
        }
        success(&format!("Applied {} migration(s) to {}", result.applied.len(), database));
    }
    Ok(())
}
