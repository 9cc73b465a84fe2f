//! Account and card commands - create and list linkable balances

use anyhow::{bail, Result};
use clap::Subcommand;
use dialoguer::Input;
use rust_decimal::Decimal;
use uuid::Uuid;

use tally_core::ports::AccountStore;
use tally_core::services::parse_amount;
use tally_core::{Account, AccountKind, AccountRef, CreditCard, LogEvent};

use super::{get_context, get_logger, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Add a bank account or wallet
    Add {
        /// Account name
        name: Option<String>,
        /// Account kind: bank or wallet
        #[arg(long, default_value = "bank")]
        kind: String,
        /// Institution name
        #[arg(long)]
        institution: Option<String>,
        /// Opening balance
        #[arg(long)]
        balance: Option<String>,
        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List accounts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum CardCommands {
    /// Add a credit card
    Add {
        /// Card name
        name: Option<String>,
        /// Issuer name
        #[arg(long)]
        issuer: Option<String>,
        /// Current balance owed
        #[arg(long)]
        balance_owed: Option<String>,
        /// ISO 4217 currency code
        #[arg(long)]
        currency: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List credit cards
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: AccountCommands) -> Result<()> {
    match command {
        AccountCommands::Add {
            name,
            kind,
            institution,
            balance,
            currency,
            json,
        } => add_account(name, kind, institution, balance, currency, json).await,
        AccountCommands::List { json } => list_accounts(json).await,
    }
}

pub async fn run_card(command: CardCommands) -> Result<()> {
    match command {
        CardCommands::Add {
            name,
            issuer,
            balance_owed,
            currency,
            json,
        } => add_card(name, issuer, balance_owed, currency, json).await,
        CardCommands::List { json } => list_cards(json).await,
    }
}

fn parse_balance(value: Option<String>) -> Result<Decimal> {
    match value {
        Some(s) => {
            parse_amount(&s).ok_or_else(|| anyhow::anyhow!("Invalid balance amount: {s}"))
        }
        None => Ok(Decimal::ZERO),
    }
}

async fn add_account(
    name: Option<String>,
    kind: String,
    institution: Option<String>,
    balance: Option<String>,
    currency: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Account name").interact_text()?,
    };
    let Some(kind) = AccountKind::parse(&kind.to_lowercase()) else {
        bail!("Invalid account kind: {kind} (expected bank or wallet)");
    };

    let mut account = Account::new(Uuid::new_v4(), name, kind);
    account.institution = institution;
    account.balance = parse_balance(balance)?;
    if let Some(c) = currency {
        account.currency = Account::normalize_currency(&c);
    }

    ctx.accounts.add_account(&account).await?;
    log_event(&get_logger(), LogEvent::command("account add"));

    if json {
        println!("{}", serde_json::to_string_pretty(&account)?);
    } else {
        output::success("Account created");
        println!("  ID: {}", account.id);
        println!("  Link transactions with --account {}", account.id);
    }
    Ok(())
}

async fn list_accounts(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let accounts = ctx.accounts.accounts().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&accounts)?);
        return Ok(());
    }

    if accounts.is_empty() {
        println!("No accounts yet. Create one with 'tally account add'.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Kind", "Institution", "Balance", "ID"]);
    for a in &accounts {
        table.add_row(vec![
            a.name.clone(),
            a.kind.as_str().to_string(),
            a.institution.clone().unwrap_or_else(|| "-".to_string()),
            format!("{} {}", a.currency, a.balance),
            a.id.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

async fn add_card(
    name: Option<String>,
    issuer: Option<String>,
    balance_owed: Option<String>,
    currency: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Card name").interact_text()?,
    };

    let mut card = CreditCard::new(Uuid::new_v4(), name);
    card.issuer = issuer;
    card.balance_owed = parse_balance(balance_owed)?;
    if let Some(c) = currency {
        card.currency = Account::normalize_currency(&c);
    }

    ctx.accounts.add_credit_card(&card).await?;
    log_event(&get_logger(), LogEvent::command("card add"));

    if json {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        output::success("Credit card created");
        println!("  ID: {}", card.id);
        println!(
            "  Link transactions with --account {}{}",
            AccountRef::CREDIT_CARD_PREFIX,
            card.id
        );
    }
    Ok(())
}

async fn list_cards(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let cards = ctx.accounts.credit_cards().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    if cards.is_empty() {
        println!("No credit cards yet. Create one with 'tally card add'.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Name", "Issuer", "Owed", "ID"]);
    for c in &cards {
        table.add_row(vec![
            c.name.clone(),
            c.issuer.clone().unwrap_or_else(|| "-".to_string()),
            format!("{} {}", c.currency, c.balance_owed),
            c.id.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
