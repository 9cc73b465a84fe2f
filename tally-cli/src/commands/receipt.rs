//! Receipt command - analyze a photographed receipt

use std::path::PathBuf;

use anyhow::{Context, Result};
use tally_core::ports::ReceiptImage;
use tally_core::IngestRequest;

use super::run_ingest;

pub async fn run(file: PathBuf, json: bool) -> Result<()> {
    let bytes =
        std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("receipt")
        .to_string();

    run_ingest(
        "Analyzing receipt...",
        IngestRequest::Receipt {
            image: ReceiptImage { file_name, bytes },
        },
        json,
    )
    .await
}
