//! Assistant replies
//!
//! [`ChatResponder`] turns a user message plus the conversation so far into a
//! single prompt and hands it to a [`LanguageModel`]. Upstream failures are
//! folded into the small [`ChatError`] taxonomy the HTTP layer maps to
//! status codes.

pub mod gemini;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{error, info};

use crate::models::Message;

pub use prompt::{DEFAULT_SYSTEM_PROMPT, build_prompt};

/// Reply used when the model answers with no text
pub const FALLBACK_REPLY: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// Failure categories of the language model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("API rate limit exceeded. Please try again in a few moments.")]
    RateLimited,
    #[error("Invalid API configuration. Please contact administrator.")]
    Unauthorized,
    #[error("Content was blocked due to safety policies. Please rephrase your message.")]
    ContentBlocked,
    #[error("Language model request failed: {0}")]
    Upstream(String),
}

/// Classify an upstream failure from its HTTP status and error text
///
/// The status wins when it is conclusive; otherwise the text is sniffed for
/// well-known markers.
pub fn classify_failure(status: Option<StatusCode>, message: &str) -> ChatError {
    match status {
        Some(StatusCode::TOO_MANY_REQUESTS) => return ChatError::RateLimited,
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            return ChatError::Unauthorized;
        }
        _ => {}
    }

    let lowered = message.to_lowercase();
    if lowered.contains("quota") || lowered.contains("rate limit") {
        ChatError::RateLimited
    } else if lowered.contains("api_key") || lowered.contains("authentication") {
        ChatError::Unauthorized
    } else if lowered.contains("safety") {
        ChatError::ContentBlocked
    } else {
        ChatError::Upstream(message.to_string())
    }
}

/// A text generation backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion, `None` when the model produced no text
    async fn generate(&self, prompt: &str) -> Result<Option<String>, ChatError>;

    /// Model identifier used in logs
    fn model_name(&self) -> &str;
}

/// Produces assistant replies for chat messages
#[derive(Clone)]
pub struct ChatResponder {
    model: Arc<dyn LanguageModel>,
    system_prompt: String,
}

impl ChatResponder {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self::with_system_prompt(model, DEFAULT_SYSTEM_PROMPT)
    }

    pub fn with_system_prompt(model: Arc<dyn LanguageModel>, system_prompt: impl Into<String>) -> Self {
        Self {
            model,
            system_prompt: system_prompt.into(),
        }
    }

    /// Generate the reply to `message` given the earlier turns
    pub async fn respond(
        &self,
        message: &str,
        history: &[Message],
        subject: &str,
    ) -> Result<String, ChatError> {
        let prompt = build_prompt(&self.system_prompt, history, message);
        info!(
            "Sending request to {} for user {} ({} history messages)",
            self.model.model_name(),
            subject,
            history.len()
        );

        match self.model.generate(&prompt).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                info!("Received response for user {}", subject);
                Ok(text)
            }
            Ok(_) => {
                info!("Empty completion for user {}, using fallback reply", subject);
                Ok(FALLBACK_REPLY.to_string())
            }
            Err(e) => {
                error!("Language model error for user {}: {}", subject, e);
                Err(e)
            }
        }
    }
}
