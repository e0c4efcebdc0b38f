//! Assistant call sites over an external text-completion service.
//!
//! The service itself is opaque: implement [`TextCompletion`] to plug in a
//! backend. Every call site here degrades to a fixed fallback when the
//! backend fails and never retries.
//!
//! | Call site | Entry point | Fallback |
//! |-----------|-------------|----------|
//! | Ranked-search summary | [`search_summary`] | `None` |
//! | Document explanation | [`explain_document`] | [`FALLBACK_REPLY`] |
//! | Chat | [`ChatSession::send`] | [`FALLBACK_REPLY`] |
//! | Recovery message | [`crate::recovery::recover`] | templated notice |

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{Document, Language};

/// Model turn used when a call fails.
pub const FALLBACK_REPLY: &str = "Error.";

/// A one-shot completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub language: Language,
    /// Overrides the backend's configured temperature.
    pub temperature: Option<f32>,
    /// Overrides the backend's configured output cap.
    pub max_output_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, language: Language) -> Self {
        Self {
            prompt: prompt.into(),
            language,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// An external text-generation backend.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Backend identifier, e.g. `"gemini"` or `"disabled"`.
    fn name(&self) -> &str;

    /// One-shot prompt to text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Next model turn for a conversation. `history` ends with the user
    /// turn being answered.
    async fn chat(&self, system_instruction: &str, history: &[ChatTurn]) -> Result<String>;
}

// ═══════════════════════════════════════════════════════════════════════
// Prompts
// ═══════════════════════════════════════════════════════════════════════

pub fn search_prompt(query: &str, docs: &[&Document], language: Language) -> String {
    let catalog = docs
        .iter()
        .map(|d| format!("{} ({}): {}", d.title, d.doc_type.display_name(), d.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "A worker is searching the industrial document library for: \"{query}\".\n\
         Available documents:\n{catalog}\n\n\
         Which documents are the most relevant? Answer in the language \"{lang}\" \
         with a brief two-line recommendation that highlights the most critical one.",
        query = query,
        catalog = catalog,
        lang = language.code(),
    )
}

pub fn explanation_prompt(doc: &Document, language: Language) -> String {
    format!(
        "Briefly explain why this industrial document matters: \"{title}\" of type \"{kind}\".\n\
         Context: {description}\n\
         Answer in the language \"{lang}\", professionally and concisely, for a factory operator.",
        title = doc.title,
        kind = doc.doc_type.display_name(),
        description = doc.description,
        lang = language.code(),
    )
}

pub fn recovery_prompt(name: &str, email: &str, language: Language) -> String {
    format!(
        "Write the body of a professional corporate email for an employee named {name} ({email}) \
         who asked to recover their InduDocs password. Answer in the language \"{lang}\". \
         The tone must be corporate, secure and reassuring. State that a temporary link has been \
         sent. Reply with the message body only.",
        name = name,
        email = email,
        lang = language.code(),
    )
}

/// System instruction for the chat assistant, embedding the visible catalog.
pub fn chat_instruction(docs: &[&Document], language: Language) -> String {
    let catalog = docs
        .iter()
        .map(|d| format!("- [{}] {}: {}", d.doc_type.display_name(), d.title, d.description))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are the InduDocs virtual assistant. You help site staff to:\n\
         1. Carry out cleaning and maintenance work following the official instructions.\n\
         2. Operate industrial machinery safely.\n\
         3. Look up safety data sheets for chemical products.\n\n\
         DOCUMENT LIBRARY:\n{catalog}\n\n\
         RULES:\n\
         - Always answer in the requested language: \"{lang}\".\n\
         - Be extremely concise and put physical safety first.\n\
         - If the question is not covered by the documents, tell the user clearly to ask their site supervisor.\n\
         - Always cite the official document name when giving an instruction.",
        catalog = catalog,
        lang = language.code(),
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Call sites
// ═══════════════════════════════════════════════════════════════════════

/// Ranked-search summary over the currently visible documents.
///
/// Returns `None` for an empty query or when the backend fails.
pub async fn search_summary(
    backend: &dyn TextCompletion,
    query: &str,
    docs: &[&Document],
    language: Language,
) -> Option<String> {
    if query.is_empty() {
        return None;
    }
    let request = CompletionRequest::new(search_prompt(query, docs, language), language);
    match backend.complete(&request).await {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "search summary failed");
            None
        }
    }
}

/// Short explanation of one document for an operator.
pub async fn explain_document(
    backend: &dyn TextCompletion,
    doc: &Document,
    language: Language,
) -> String {
    let mut request = CompletionRequest::new(explanation_prompt(doc, language), language);
    request.temperature = Some(0.7);
    request.max_output_tokens = Some(200);
    match backend.complete(&request).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, doc = %doc.id, "explanation failed");
            FALLBACK_REPLY.to_string()
        }
    }
}

/// A conversation seeded with the document catalog.
///
/// The session owns the transcript; each [`send`](ChatSession::send)
/// replays it to the backend. The localized welcome is shown to the user
/// only and never enters the transcript, so the backend history always
/// opens with a user turn.
#[derive(Debug, Clone)]
pub struct ChatSession {
    system_instruction: String,
    welcome: &'static str,
    transcript: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new(docs: &[&Document], language: Language) -> Self {
        Self {
            system_instruction: chat_instruction(docs, language),
            welcome: language.welcome(),
            transcript: Vec::new(),
        }
    }

    /// Greeting to display before the first message.
    pub fn welcome(&self) -> &str {
        self.welcome
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    /// Sends one user message. Blank input is ignored and returns `None`.
    /// A backend failure records and returns [`FALLBACK_REPLY`].
    pub async fn send(&mut self, backend: &dyn TextCompletion, message: &str) -> Option<String> {
        let message = message.trim();
        if message.is_empty() {
            return None;
        }
        self.transcript.push(ChatTurn::user(message));

        let reply = match backend.chat(&self.system_instruction, &self.transcript).await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => FALLBACK_REPLY.to_string(),
            Err(e) => {
                tracing::warn!(backend = backend.name(), error = %e, "chat turn failed");
                FALLBACK_REPLY.to_string()
            }
        };
        self.transcript.push(ChatTurn::model(reply.clone()));
        Some(reply)
    }
}
