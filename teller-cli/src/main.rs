//! Teller CLI - banking backend server and operator tools

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::{accounts, credit, delete, migrate, serve};

/// Teller - a minimal banking backend
#[derive(Parser)]
#[command(name = "teller", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Address to bind (overrides settings)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides settings)
        #[arg(long, short)]
        port: Option<u16>,
        /// Keep all data in memory
        #[arg(long)]
        in_memory: bool,
    },

    /// List accounts
    Accounts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit funds into an account
    Credit {
        /// Account number
        number: i64,
        /// Amount in the smallest currency unit
        amount: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete an account
    Delete {
        /// Account id
        id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Apply pending database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,teller_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve { host, port, in_memory } => serve::run(host, port, in_memory).await,
        Commands::Accounts { json } => accounts::run(json).await,
        Commands::Credit { number, amount, json } => credit::run(number, amount, json).await,
        Commands::Delete { id, force } => delete::run(id, force).await,
        Commands::Migrate { dry_run, json } => migrate::run(dry_run, json).await,
    }
}
