//! Chat service — question about the on-screen estimate → LLM reply.
//!
//! The browser sends the user's question with a read-only snapshot of the
//! current selections. The snapshot is pretty-printed into the prompt; the
//! model never sees pixel geometry.

use canvas::snapshot::Snapshot;
use serde_json::Value;
use tracing::info;

use crate::error::ErrorCode;
use crate::llm::LlmChat;
use crate::llm::types::{LlmError, Message, ResponseFormat};

/// Reply used when the model returns no text.
pub const NO_REPLY: &str = "No reply generated.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Missing message")]
    MissingMessage,
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingMessage => "E_MISSING_MESSAGE",
            Self::Encode(_) => "E_ENCODE",
            Self::Llm(_) => "E_LLM_ERROR",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Llm(e) if e.retryable())
    }
}

/// The message must be a non-blank string.
///
/// # Errors
///
/// [`ChatError::MissingMessage`] otherwise.
pub fn validate_message(message: Option<&Value>) -> Result<&str, ChatError> {
    match message {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text),
        _ => Err(ChatError::MissingMessage),
    }
}

/// Question followed by the pretty-printed snapshot (`{}` when absent).
///
/// # Errors
///
/// [`ChatError::Encode`] if the snapshot cannot be serialized.
pub fn build_user_prompt(message: &str, snapshot: Option<&Snapshot>) -> Result<String, ChatError> {
    let snapshot = match snapshot {
        Some(snapshot) => serde_json::to_string_pretty(snapshot)?,
        None => "{}".to_string(),
    };
    Ok(format!("User question:\n{message}\n\nEstimator snapshot (read-only):\n{snapshot}"))
}

/// Ask the model about the estimate.
///
/// # Errors
///
/// [`ChatError::Llm`] when the provider call fails.
pub async fn reply(
    llm: &dyn LlmChat,
    message: &str,
    snapshot: Option<&Snapshot>,
    max_tokens: u32,
) -> Result<String, ChatError> {
    let prompt = build_user_prompt(message, snapshot)?;
    info!(
        message_len = message.len(),
        selections = snapshot.map_or(0, |s| s.selections_count),
        "chat: question received"
    );

    let response = llm
        .chat(max_tokens, "", &[Message::user_text(prompt)], ResponseFormat::Text)
        .await?;

    info!(
        model = %response.model,
        input_tokens = response.input_tokens,
        output_tokens = response.output_tokens,
        "chat: LLM response"
    );

    let text = response.text();
    let text = text.trim();
    Ok(if text.is_empty() { NO_REPLY.to_string() } else { text.to_string() })
}

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;
