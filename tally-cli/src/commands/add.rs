//! Add command - record a transaction by hand

use anyhow::{bail, Result};
use chrono::NaiveDate;
use dialoguer::Input;
use tally_core::{Flow, IngestRequest, ManualEntry};

use super::run_ingest;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    amount: Option<String>,
    flow: String,
    date: Option<String>,
    description: Option<String>,
    merchant: Option<String>,
    category: Option<String>,
    account: Option<String>,
    json: bool,
) -> Result<()> {
    let amount = match amount {
        Some(a) => a,
        None => Input::new().with_prompt("Amount").interact_text()?,
    };

    let flow = match flow.to_lowercase().as_str() {
        "expense" => Flow::Expense,
        "income" => Flow::Income,
        other => bail!("Invalid type: {other} (expected expense or income)"),
    };

    let date = date
        .map(|d| {
            NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| anyhow::anyhow!("Invalid date format. Use YYYY-MM-DD"))
        })
        .transpose()?;

    let entry = ManualEntry {
        amount,
        flow: Some(flow),
        date,
        description,
        merchant,
        category,
        account_selection: account,
    };

    run_ingest(
        "Saving transaction...",
        IngestRequest::Manual { entry },
        json,
    )
    .await
}
