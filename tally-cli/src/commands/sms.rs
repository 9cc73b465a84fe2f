//! Sms command - parse a transaction SMS and record the result

use anyhow::Result;
use dialoguer::Input;
use tally_core::IngestRequest;

use super::run_ingest;

pub async fn run(text: Option<String>, json: bool) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => Input::new().with_prompt("SMS text").interact_text()?,
    };

    run_ingest("Analyzing SMS...", IngestRequest::Sms { text }, json).await
}
