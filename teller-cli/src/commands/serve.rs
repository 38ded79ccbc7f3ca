//! Serve command - run the HTTP API

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use teller_core::api::create_router;

use super::{context_for, load_config};

pub async fn run(host: Option<String>, port: Option<u16>, in_memory: bool) -> Result<()> {
    let (mut config, data_dir) = load_config()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if in_memory {
        config.storage.in_memory = true;
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let ctx = Arc::new(context_for(config, &data_dir).await?);
    let app = create_router(ctx);

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Teller API listening on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Teller API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
