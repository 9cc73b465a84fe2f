//! Output formatting utilities

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use tally_core::{present, AssetType, IngestReport, Source, Transaction};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn tone_colored(text: &str, tone: &str) -> ColoredString {
    match tone {
        "yellow" => text.yellow(),
        "blue" => text.blue(),
        "purple" => text.magenta(),
        "red" => text.red(),
        "emerald" => text.green(),
        "indigo" => text.cyan(),
        _ => text.normal(),
    }
}

/// Badge line for a classification, e.g. `🥇 Gold`.
pub fn badge_line(asset_type: AssetType) -> String {
    let p = present(asset_type);
    format!(
        "{} {}",
        p.badge.emoji,
        tone_colored(p.badge.label, p.badge.tone).bold()
    )
}

/// Render one created transaction as a result card.
pub fn render_transaction(tx: &Transaction) {
    let p = present(tx.asset_type);

    println!("{}", badge_line(tx.asset_type));
    println!("  Amount: {} {}", tx.currency, tx.amount);

    match tx.asset_type {
        AssetType::Gold => {
            if let Some(weight) = tx.weight_grams {
                println!("  Weight: {}g", weight);
            }
            println!(
                "  Item: {}",
                tx.ornament_name.as_deref().unwrap_or("Gold Item")
            );
        }
        AssetType::Stock => {
            if let Some(symbol) = &tx.stock_symbol {
                println!("  Symbol: {}", symbol);
            }
            if let Some(units) = tx.units {
                println!("  Units: {}", units);
            }
        }
        _ => {
            println!("  Merchant: {}", tx.merchant.as_deref().unwrap_or("General"));
            println!(
                "  Category: {}",
                tx.category.as_deref().unwrap_or("Uncategorized")
            );
        }
    }

    if let Some(desc) = &tx.description {
        println!("  {}", format!("\"{desc}\"").dimmed());
    }
    println!("  View: {}", p.link);
}

/// Render an ingestion report: result card for single submissions, batch
/// summary for statements.
pub fn render_report(report: &IngestReport) {
    if report.source == Source::Statement {
        render_statement_report(report);
    } else if let Some(tx) = report.transactions.first() {
        success("Transaction created");
        println!();
        render_transaction(tx);
    }

    for w in &report.warnings {
        warning(w);
    }
}

fn render_statement_report(report: &IngestReport) {
    success("Statement processed");
    println!();

    if !report.transactions.is_empty() {
        let mut table = create_table();
        table.set_header(vec!["Date", "Amount", "Description"]);
        for tx in report.transactions.iter().take(10) {
            table.add_row(vec![
                tx.date.to_string(),
                format!("{} {}", tx.currency, tx.amount),
                tx.description.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        println!("{table}");
        if report.transactions.len() > 10 {
            println!("... and {} more", report.transactions.len() - 10);
        }
        println!();
    }

    println!("  Created: {}", report.transactions.len());
    println!("  Duplicates: {}", report.duplicates);
    println!("  Failed: {}", report.failed);
}
