//! Accounts command - list accounts

use anyhow::Result;
use colored::Colorize;

use super::get_repository;
use crate::output::{create_table, format_amount};

pub async fn run(json: bool) -> Result<()> {
    let repository = get_repository().await?;
    let accounts = repository.get_accounts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("{}", "No accounts".dimmed());
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Number", "Name", "Email", "Balance", "Created"]);
    for account in &accounts {
        table.add_row(vec![
            account.id.to_string(),
            account.number.to_string(),
            format!("{} {}", account.first_name, account.last_name),
            account.email.clone(),
            format_amount(account.balance),
            account.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("{} account(s)", accounts.len()).dimmed());
    Ok(())
}
