//! Demo command - manage demo mode

use anyhow::Result;
use clap::Subcommand;
use tally_core::adapters::demo::{demo_accounts, demo_cards};
use tally_core::config::Config;
use tally_core::ports::{AccountStore, NetWorthRefresher};
use tally_core::LogEvent;

use super::{get_context, get_logger, get_tally_dir, log_event};
use crate::output;

#[derive(Subcommand)]
pub enum DemoCommands {
    /// Enable demo mode and seed demo data
    On,
    /// Disable demo mode
    Off,
    /// Show whether demo mode is enabled
    Status,
}

pub async fn run(command: Option<DemoCommands>) -> Result<()> {
    let tally_dir = get_tally_dir();
    std::fs::create_dir_all(&tally_dir)?;
    let mut config = Config::load(&tally_dir)?;

    match command.unwrap_or(DemoCommands::Status) {
        DemoCommands::On => {
            config.enable_demo_mode();
            config.save(&tally_dir)?;

            // Seed the demo database on first use.
            let ctx = get_context()?;
            if ctx.accounts.accounts().await?.is_empty() {
                for account in demo_accounts() {
                    ctx.accounts.add_account(&account).await?;
                }
                for card in demo_cards() {
                    ctx.accounts.add_credit_card(&card).await?;
                }
                ctx.net_worth.refresh().await?;
            }

            log_event(&get_logger(), LogEvent::command("demo on"));
            output::success("Demo mode enabled");
            println!("Commands now run against demo.duckdb; your data is untouched.");
        }
        DemoCommands::Off => {
            config.disable_demo_mode();
            config.save(&tally_dir)?;
            log_event(&get_logger(), LogEvent::command("demo off"));
            output::success("Demo mode disabled");
        }
        DemoCommands::Status => {
            if config.demo_mode {
                println!("Demo mode is ON");
            } else {
                println!("Demo mode is off");
            }
        }
    }
    Ok(())
}
