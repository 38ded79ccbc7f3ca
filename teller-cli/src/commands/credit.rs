//! Credit command - deposit funds into an account

use anyhow::Result;

use super::get_context;
use crate::output::{format_amount, success};

pub async fn run(number: i64, amount: i64, json: bool) -> Result<()> {
    let ctx = get_context().await?;
    let account = ctx.account_service.credit(number, amount).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
        return Ok(());
    }

    success(&format!(
        "Credited {} to account {} (balance {})",
        format_amount(amount),
        account.number,
        format_amount(account.balance)
    ));
    Ok(())
}
