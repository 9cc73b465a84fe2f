//! CLI command implementations

pub mod account;
pub mod add;
pub mod demo;
pub mod logs;
pub mod receipt;
pub mod setup;
pub mod sms;
pub mod statement;
pub mod status;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tally_core::{EventLogger, IngestReport, IngestRequest, LogEvent, OperationResult, TallyContext};

/// Get the tally directory from environment or default
pub fn get_tally_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TALLY_DIR") {
        PathBuf::from(dir)
    } else {
        dirs::home_dir()
            .expect("Could not find home directory")
            .join(".tally")
    }
}

/// Get or create the tally context
pub fn get_context() -> Result<TallyContext> {
    let tally_dir = get_tally_dir();

    std::fs::create_dir_all(&tally_dir)
        .with_context(|| format!("Failed to create tally directory: {:?}", tally_dir))?;

    TallyContext::new(&tally_dir).context("Failed to initialize tally context")
}

/// Get the event logger for CLI operations
///
/// Returns None if logging fails to initialize (logging never blocks a
/// command).
pub fn get_logger() -> Option<EventLogger> {
    let dir = get_tally_dir();
    std::fs::create_dir_all(&dir).ok()?;
    EventLogger::new(&dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<EventLogger>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Run one ingestion request with a spinner, event logging, and rendering.
pub async fn run_ingest(spinner_msg: &str, request: IngestRequest, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger();
    let modality = request.source().as_str().to_lowercase();
    let started = Instant::now();

    let spinner = (!json).then(|| {
        let s = ProgressBar::new_spinner();
        s.set_style(ProgressStyle::default_spinner());
        s.set_message(spinner_msg.to_string());
        s.enable_steady_tick(Duration::from_millis(120));
        s
    });

    let result = ctx.ingest_service.ingest(request).await;

    if let Some(s) = spinner {
        s.finish_and_clear();
    }

    let mut event = LogEvent::ingest(modality);
    event.duration_ms = started.elapsed().as_millis() as i64;

    match result {
        Ok(report) => {
            event.created = report.transactions.len() as i64;
            event.duplicates = report.duplicates;
            event.failed = report.failed;
            log_event(&logger, event);

            if json {
                let envelope = OperationResult::ok(report);
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                crate::output::render_report(&report);
            }
            Ok(())
        }
        Err(e) => {
            event.outcome = "error";
            event.stage = Some(e.stage());
            log_event(&logger, event);

            if json {
                // JSON mode reports the failure inside the envelope.
                let envelope: OperationResult<IngestReport> = OperationResult::fail(e.to_string());
                println!("{}", serde_json::to_string_pretty(&envelope)?);
                Ok(())
            } else {
                Err(e.into())
            }
        }
    }
}
