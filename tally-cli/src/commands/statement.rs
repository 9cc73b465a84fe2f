//! Statement command - upload a bank statement and record its line items

use std::path::PathBuf;

use anyhow::{Context, Result};
use tally_core::ports::StatementFile;
use tally_core::IngestRequest;

use super::run_ingest;

pub async fn run(file: PathBuf, account_id: Option<String>, json: bool) -> Result<()> {
    let bytes =
        std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement")
        .to_string();

    // A missing account id is rejected by the pipeline, not here.
    run_ingest(
        "Parsing statement... This may take a moment.",
        IngestRequest::Statement {
            file: StatementFile { file_name, bytes },
            account_id,
        },
        json,
    )
    .await
}
