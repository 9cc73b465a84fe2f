//! Setup command - configure the inference service and base currency

use anyhow::Result;
use dialoguer::Input;
use tally_core::config::Config;
use tally_core::{Account, INFERENCE_TOKEN_ENV};

use super::get_tally_dir;
use crate::output;

pub fn run(base_url: Option<String>, currency: Option<String>) -> Result<()> {
    let tally_dir = get_tally_dir();
    std::fs::create_dir_all(&tally_dir)?;
    let mut config = Config::load(&tally_dir).unwrap_or_default();

    let base_url = match base_url {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Inference service base URL")
            .default(config.inference_base_url.clone())
            .interact_text()?,
    };
    config.inference_base_url = base_url;

    if let Some(c) = currency {
        config.base_currency = Account::normalize_currency(&c);
    }

    config.save(&tally_dir)?;

    output::success("Settings saved");
    println!(
        "Set {} in your environment to authenticate against the inference service.",
        INFERENCE_TOKEN_ENV
    );
    Ok(())
}
