//! TOML configuration parsing.
//!
//! ```toml
//! [store]
//! path = "./data/indudocs.json"
//!
//! [assistant]
//! provider = "gemini"
//! model = "gemini-3-flash-preview"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            chat_model: default_chat_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_output_tokens: None,
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}
fn default_chat_model() -> String {
    "gemini-3-pro-preview".to_string()
}
fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.7
}

impl AssistantConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.store.path.as_os_str().is_empty() {
        anyhow::bail!("store.path must not be empty");
    }

    let assistant = &config.assistant;
    match assistant.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown assistant provider: '{}'. Must be disabled or gemini.",
            other
        ),
    }

    if assistant.timeout_secs == 0 {
        anyhow::bail!("assistant.timeout_secs must be > 0");
    }

    if !(0.0..=2.0).contains(&assistant.temperature) {
        anyhow::bail!("assistant.temperature must be in [0.0, 2.0]");
    }

    if assistant.is_enabled() && (assistant.model.is_empty() || assistant.chat_model.is_empty()) {
        anyhow::bail!(
            "assistant.model and assistant.chat_model must be set when provider is '{}'",
            assistant.provider
        );
    }

    if assistant.max_output_tokens == Some(0) {
        anyhow::bail!("assistant.max_output_tokens must be > 0 when set");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_src: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_src)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_defaults() {
        let config = parse("[store]\npath = \"./data/indudocs.json\"\n").unwrap();
        assert!(!config.assistant.is_enabled());
        assert_eq!(config.assistant.timeout_secs, 30);
        assert_eq!(config.assistant.model, "gemini-3-flash-preview");
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = parse("[store]\npath = \"x.json\"\n[assistant]\nprovider = \"openai\"\n")
            .unwrap_err();
        assert!(err.to_string().contains("Unknown assistant provider"));
    }

    #[test]
    fn test_temperature_range() {
        assert!(parse("[store]\npath = \"x.json\"\n[assistant]\ntemperature = 3.5\n").is_err());
        assert!(parse("[store]\npath = \"x.json\"\n[assistant]\ntemperature = 1.0\n").is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(parse("[store]\npath = \"x.json\"\n[assistant]\ntimeout_secs = 0\n").is_err());
    }
}
