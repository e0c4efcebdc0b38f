//! Text-completion backends.
//!
//! Implementations of [`TextCompletion`]:
//! - **[`DisabledCompleter`]** — always fails; every call site then uses its
//!   fallback text. Used when `assistant.provider = "disabled"`.
//! - **[`GeminiCompleter`]** — calls the Gemini `generateContent` endpoint.
//!
//! # Provider Selection
//!
//! ```rust,no_run
//! # use indudocs::config::AssistantConfig;
//! # use indudocs::completion::create_completer;
//! let config = AssistantConfig::default(); // provider = "disabled"
//! let completer = create_completer(&config).unwrap();
//! assert_eq!(completer.name(), "disabled");
//! ```
//!
//! Calls are never retried. The HTTP client carries the configured timeout
//! so a stalled request ends the command instead of hanging it.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use indudocs_core::assistant::{ChatRole, ChatTurn, CompletionRequest, TextCompletion};

use crate::config::AssistantConfig;

/// Environment variable holding the Gemini API key.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

// ============ Disabled ============

pub struct DisabledCompleter;

#[async_trait]
impl TextCompletion for DisabledCompleter {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<String> {
        bail!("Assistant provider is disabled")
    }

    async fn chat(&self, _system_instruction: &str, _history: &[ChatTurn]) -> Result<String> {
        bail!("Assistant provider is disabled")
    }
}

// ============ Gemini ============

/// Completer backed by the Gemini `generateContent` REST endpoint.
///
/// One-shot requests use `assistant.model`; chat requests use
/// `assistant.chat_model`. Requires [`API_KEY_VAR`] in the environment.
pub struct GeminiCompleter {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    chat_model: String,
    temperature: f32,
    max_output_tokens: Option<u32>,
}

impl GeminiCompleter {
    pub fn new(config: &AssistantConfig) -> Result<Self> {
        let api_key = std::env::var(API_KEY_VAR)
            .map_err(|_| anyhow!("{} environment variable not set", API_KEY_VAR))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(config: &AssistantConfig, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }

    async fn generate(&self, model: &str, body: &Value) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Gemini API error {}: {}", status, body_text);
        }

        let json: Value = response.json().await?;
        parse_generate_response(&json)
    }
}

#[async_trait]
impl TextCompletion for GeminiCompleter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = build_request_body(
            None,
            &[ChatTurn::user(request.prompt.clone())],
            request.temperature.unwrap_or(self.temperature),
            request.max_output_tokens.or(self.max_output_tokens),
        );
        self.generate(&self.model, &body).await
    }

    async fn chat(&self, system_instruction: &str, history: &[ChatTurn]) -> Result<String> {
        let body = build_request_body(
            Some(system_instruction),
            history,
            self.temperature,
            self.max_output_tokens,
        );
        self.generate(&self.chat_model, &body).await
    }
}

/// Builds a `generateContent` request body.
fn build_request_body(
    system_instruction: Option<&str>,
    turns: &[ChatTurn],
    temperature: f32,
    max_output_tokens: Option<u32>,
) -> Value {
    let contents: Vec<Value> = turns
        .iter()
        .map(|t| {
            let role = match t.role {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": t.text }] })
        })
        .collect();

    let mut generation_config = json!({ "temperature": temperature });
    if let Some(max) = max_output_tokens {
        generation_config["maxOutputTokens"] = json!(max);
    }

    let mut body = json!({
        "contents": contents,
        "generationConfig": generation_config,
    });
    if let Some(system) = system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    body
}

/// Concatenates `candidates[0].content.parts[*].text`.
fn parse_generate_response(json: &Value) -> Result<String> {
    let parts = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing candidates[0].content.parts"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        bail!("Gemini response contained no text");
    }
    Ok(text)
}

/// Create the [`TextCompletion`] backend named by the configuration.
///
/// | Config Value | Backend |
/// |-------------|---------|
/// | `"disabled"` | [`DisabledCompleter`] |
/// | `"gemini"` | [`GeminiCompleter`] |
pub fn create_completer(config: &AssistantConfig) -> Result<Box<dyn TextCompletion>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledCompleter)),
        "gemini" => Ok(Box::new(GeminiCompleter::new(config)?)),
        other => bail!("Unknown assistant provider: {}", other),
    }
}

/// Like [`create_completer`], but a backend that cannot be built (for
/// example a missing API key) degrades to [`DisabledCompleter`] so callers
/// reach their fallback text instead of failing outright.
pub fn create_completer_or_disabled(config: &AssistantConfig) -> Box<dyn TextCompletion> {
    match create_completer(config) {
        Ok(completer) => completer,
        Err(e) => {
            tracing::warn!(provider = %config.provider, error = %e, "assistant unavailable, using fallbacks");
            Box::new(DisabledCompleter)
        }
    }
}
