//! Delete command - remove an account

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use super::get_context;
use crate::output::format_amount;

pub async fn run(id: i64, force: bool) -> Result<()> {
    let ctx = get_context().await?;
    let account = ctx.account_service.get(id).await?;

    // Confirm removal unless --force
    if !force {
        println!(
            "\n{}",
            format!(
                "This will delete account {} ({}) with balance {}.",
                account.number,
                account.email,
                format_amount(account.balance)
            )
            .yellow()
        );

        let confirmed = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("Are you sure?")
                .default(false)
                .interact()
        })
        .await??;

        if !confirmed {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    ctx.account_service.delete(id).await?;
    println!("\n{} Account {} deleted\n", "✓".green(), account.number);

    Ok(())
}
