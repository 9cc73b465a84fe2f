//! Status command - accounts, cards, ledgers, and net worth at a glance

use anyhow::Result;
use serde_json::json;
use tally_core::ports::{AccountStore, LedgerStore, NetWorthRefresher};
use tally_core::Ledger;

use super::get_context;
use crate::output;

pub async fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let accounts = ctx.accounts.accounts().await?;
    let cards = ctx.accounts.credit_cards().await?;
    let snapshot = ctx.net_worth.latest().await?;

    let mut ledger_counts = Vec::new();
    for ledger in Ledger::ALL {
        let count = ctx.ledger.transactions(ledger).await?.len();
        ledger_counts.push((ledger, count));
    }

    if json {
        let payload = json!({
            "demoMode": ctx.config.demo_mode,
            "baseCurrency": ctx.config.base_currency,
            "accounts": accounts,
            "creditCards": cards,
            "ledgers": ledger_counts
                .iter()
                .map(|(l, n)| json!({"ledger": l.as_str(), "transactions": n}))
                .collect::<Vec<_>>(),
            "netWorth": snapshot,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if ctx.config.demo_mode {
        output::warning("Demo mode is on; showing demo data.");
        println!();
    }

    if accounts.is_empty() && cards.is_empty() {
        println!("Nothing linked yet. Create an account with 'tally account add'.");
    }

    if !accounts.is_empty() {
        output::info("Accounts");
        let mut table = output::create_table();
        table.set_header(vec!["Name", "Kind", "Balance"]);
        for a in &accounts {
            table.add_row(vec![
                a.name.clone(),
                a.kind.as_str().to_string(),
                format!("{} {}", a.currency, a.balance),
            ]);
        }
        println!("{table}");
        println!();
    }

    if !cards.is_empty() {
        output::info("Credit cards");
        let mut table = output::create_table();
        table.set_header(vec!["Name", "Owed"]);
        for c in &cards {
            table.add_row(vec![
                c.name.clone(),
                format!("{} {}", c.currency, c.balance_owed),
            ]);
        }
        println!("{table}");
        println!();
    }

    output::info("Ledgers");
    let mut table = output::create_table();
    table.set_header(vec!["Ledger", "Transactions"]);
    for (ledger, count) in &ledger_counts {
        table.add_row(vec![ledger.as_str().to_string(), count.to_string()]);
    }
    println!("{table}");
    println!();

    match snapshot {
        Some(s) => {
            println!(
                "Net worth: {} {} (assets {} / liabilities {}), computed {}",
                ctx.config.base_currency,
                s.net,
                s.assets,
                s.liabilities,
                s.computed_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => println!("Net worth: not computed yet."),
    }

    Ok(())
}
