//! Simulated account recovery.
//!
//! Looks the email up case-insensitively. When an account exists, the
//! assistant writes the notification text (or a fixed template is used if
//! it fails) and the flow reports success. When no account exists the flow
//! says so explicitly.

use crate::assistant::{recovery_prompt, CompletionRequest, TextCompletion};
use crate::models::{Language, User};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecoveryError {
    #[error("no account found for {0}")]
    NoAccount(String),
}

/// Outcome of a successful recovery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryNotice {
    pub user_id: String,
    pub email: String,
    pub message: String,
    /// True when the assistant failed and the template was used.
    pub used_fallback: bool,
}

pub fn fallback_message(name: &str, email: &str) -> String {
    format!(
        "Estimado {}, se ha enviado un enlace de recuperación a su correo corporativo {}.",
        name, email
    )
}

pub fn find_by_email<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    let needle = email.to_lowercase();
    users.iter().find(|u| u.email.to_lowercase() == needle)
}

pub async fn recover(
    users: &[User],
    email: &str,
    backend: &dyn TextCompletion,
    language: Language,
) -> Result<RecoveryNotice, RecoveryError> {
    let user = find_by_email(users, email).ok_or_else(|| RecoveryError::NoAccount(email.to_string()))?;

    let mut request = CompletionRequest::new(recovery_prompt(&user.name, &user.email, language), language);
    request.temperature = Some(0.8);

    let (message, used_fallback) = match backend.complete(&request).await {
        Ok(text) if !text.trim().is_empty() => (text, false),
        Ok(_) => (fallback_message(&user.name, &user.email), true),
        Err(e) => {
            tracing::warn!(backend = backend.name(), error = %e, "recovery message fell back to template");
            (fallback_message(&user.name, &user.email), true)
        }
    };

    tracing::info!(user = %user.id, "recovery notice issued");
    Ok(RecoveryNotice {
        user_id: user.id.clone(),
        email: user.email.clone(),
        message,
        used_fallback,
    })
}
