//! Logs command - inspect the privacy-safe event log

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};

use super::get_logger;
use crate::output;

pub fn run(limit: usize, clear: bool, json: bool) -> Result<()> {
    let logger = get_logger().ok_or_else(|| anyhow!("Failed to open the event log"))?;

    if clear {
        let deleted = logger.clear()?;
        output::success(&format!("Cleared {deleted} events"));
        return Ok(());
    }

    let entries = logger.recent(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No events recorded yet.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "Time", "Kind", "Name", "Outcome", "Stage", "Created", "Duration",
    ]);
    for e in &entries {
        let time = DateTime::<Utc>::from_timestamp_millis(e.ts_ms)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            time,
            e.kind.clone(),
            e.name.clone(),
            e.outcome.clone(),
            e.stage.clone().unwrap_or_else(|| "-".to_string()),
            e.created.to_string(),
            format!("{}ms", e.duration_ms),
        ]);
    }
    println!("{table}");
    Ok(())
}
