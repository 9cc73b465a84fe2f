//! Configuration management
//!
//! Settings live in `settings.json` inside the tally directory, camelCase to
//! stay compatible with the desktop app:
//! ```json
//! {
//!   "app": { "demoMode": false, "baseCurrency": "AED" },
//!   "inference": { "baseUrl": "https://...", "timeoutSecs": 20 }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    inference: InferenceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default = "default_currency")]
    base_currency: String,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            demo_mode: false,
            base_currency: default_currency(),
            other: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InferenceSettings {
    #[serde(default = "default_base_url")]
    base_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_currency() -> String {
    "AED".to_string()
}

fn default_base_url() -> String {
    "https://inference.tally.money".to_string()
}

fn default_timeout_secs() -> u64 {
    20
}

/// Tally configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub demo_mode: bool,
    pub base_currency: String,
    pub inference_base_url: String,
    /// Bounded wait for every extraction call.
    pub inference_timeout_secs: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        let raw = SettingsFile::default();
        Self {
            demo_mode: raw.app.demo_mode,
            base_currency: raw.app.base_currency.clone(),
            inference_base_url: raw.inference.base_url.clone(),
            inference_timeout_secs: raw.inference.timeout_secs,
            _raw_settings: raw,
        }
    }
}

impl Config {
    /// Load config from the tally directory
    ///
    /// Demo mode can be enabled via the settings file (`tally demo on`) or
    /// the TALLY_DEMO_MODE environment variable (for CI/testing).
    pub fn load(tally_dir: &Path) -> Result<Self> {
        let settings_path = tally_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let demo_mode = match std::env::var("TALLY_DEMO_MODE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.app.demo_mode,
        };

        Ok(Self {
            demo_mode,
            base_currency: raw.app.base_currency.clone(),
            inference_base_url: raw.inference.base_url.clone(),
            inference_timeout_secs: raw.inference.timeout_secs,
            _raw_settings: raw,
        })
    }

    /// Save config to the tally directory, preserving settings this view
    /// doesn't manage.
    pub fn save(&self, tally_dir: &Path) -> Result<()> {
        let settings_path = tally_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.demo_mode = self.demo_mode;
        settings.app.base_currency = self.base_currency.clone();
        settings.inference.base_url = self.inference_base_url.clone();
        settings.inference.timeout_secs = self.inference_timeout_secs;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Enable demo mode
    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    /// Disable demo mode
    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(!config.demo_mode);
        assert_eq!(config.base_currency, "AED");
        assert_eq!(config.inference_timeout_secs, 20);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.enable_demo_mode();
        config.base_currency = "USD".to_string();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert!(reloaded.demo_mode);
        assert_eq!(reloaded.base_currency, "USD");
    }
}
