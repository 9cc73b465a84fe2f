//! Tally CLI - multi-modal transaction capture in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{account, add, demo, logs, receipt, setup, sms, statement, status};

/// Tally - record transactions from SMS, receipts, statements, or by hand
#[derive(Parser)]
#[command(name = "tally", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transaction SMS and record the result
    Sms {
        /// SMS text (prompted for when omitted)
        text: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze a photographed receipt and record the expense
    Receipt {
        /// Path to the receipt image
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a bank statement and record its line items
    Statement {
        /// Path to the statement file (pdf, csv, xlsx, xls)
        file: PathBuf,
        /// Destination account ID; every line item is attributed to it
        #[arg(long)]
        account_id: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a transaction by hand
    Add {
        /// Amount in the base currency (prompted for when omitted)
        #[arg(long)]
        amount: Option<String>,
        /// Transaction type: expense or income
        #[arg(long = "type", default_value = "expense")]
        flow: String,
        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        merchant: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Linked account ID, or cc_<id> for a credit card
        #[arg(long)]
        account: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show accounts, cards, ledgers, and net worth
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage accounts
    Account {
        #[command(subcommand)]
        command: account::AccountCommands,
    },

    /// Manage credit cards
    Card {
        #[command(subcommand)]
        command: account::CardCommands,
    },

    /// Configure the inference service and base currency
    Setup {
        /// Inference service base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Base currency code
        #[arg(long)]
        currency: Option<String>,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },

    /// Inspect the event log
    Logs {
        /// Number of events to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Delete all stored events
        #[arg(long)]
        clear: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sms { text, json } => sms::run(text, json).await,
        Commands::Receipt { file, json } => receipt::run(file, json).await,
        Commands::Statement {
            file,
            account_id,
            json,
        } => statement::run(file, account_id, json).await,
        Commands::Add {
            amount,
            flow,
            date,
            description,
            merchant,
            category,
            account,
            json,
        } => add::run(amount, flow, date, description, merchant, category, account, json).await,
        Commands::Status { json } => status::run(json).await,
        Commands::Account { command } => account::run(command).await,
        Commands::Card { command } => account::run_card(command).await,
        Commands::Setup { base_url, currency } => setup::run(base_url, currency),
        Commands::Demo { command } => demo::run(command).await,
        Commands::Logs { limit, clear, json } => logs::run(limit, clear, json),
    }
}
