//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the parsed server config and the optional LLM client. Nothing in
//! it is mutable: every request is independent.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::llm::LlmChat;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when no provider is configured; AI endpoints answer 503.
    pub llm: Option<Arc<dyn LlmChat>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { config: Arc::new(config), llm }
    }

    /// The configured LLM client.
    ///
    /// # Errors
    ///
    /// [`ApiError::LlmUnavailable`] when none is configured.
    pub fn llm(&self) -> Result<&Arc<dyn LlmChat>, ApiError> {
        self.llm.as_ref().ok_or(ApiError::LlmUnavailable)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use super::*;
    use crate::llm::types::{ChatResponse, ContentBlock, LlmError, Message, ResponseFormat};

    /// Create a test `AppState` with default config and no LLM.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(ServerConfig::default(), None)
    }

    /// Create a test `AppState` with a mock LLM.
    #[must_use]
    pub fn test_app_state_with_llm(llm: Arc<dyn LlmChat>) -> AppState {
        AppState::new(ServerConfig::default(), Some(llm))
    }

    /// One recorded `chat` call.
    #[derive(Debug, Clone)]
    pub struct SeenCall {
        pub max_tokens: u32,
        pub system: String,
        pub messages: Vec<Message>,
        pub format: ResponseFormat,
    }

    /// Scripted LLM: answers with `reply` (or fails with `status`) and records calls.
    pub struct MockLlm {
        reply: Result<String, u16>,
        pub calls: Mutex<Vec<SeenCall>>,
    }

    impl MockLlm {
        #[must_use]
        pub fn replying(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), calls: Mutex::new(Vec::new()) }
        }

        #[must_use]
        pub fn failing(status: u16) -> Self {
            Self { reply: Err(status), calls: Mutex::new(Vec::new()) }
        }

        pub fn last_call(&self) -> SeenCall {
            let calls = self.calls.lock().unwrap();
            calls.last().cloned().expect("no chat call recorded")
        }
    }

    #[async_trait::async_trait]
    impl LlmChat for MockLlm {
        async fn chat(
            &self,
            max_tokens: u32,
            system: &str,
            messages: &[Message],
            format: ResponseFormat,
        ) -> Result<ChatResponse, LlmError> {
            self.calls.lock().unwrap().push(SeenCall {
                max_tokens,
                system: system.to_string(),
                messages: messages.to_vec(),
                format,
            });
            match &self.reply {
                Ok(text) => Ok(ChatResponse {
                    content: if text.is_empty() { vec![] } else { vec![ContentBlock::text(text.clone())] },
                    model: "mock".into(),
                    stop_reason: "end_turn".into(),
                    input_tokens: 10,
                    output_tokens: 5,
                }),
                Err(status) => Err(LlmError::ApiResponse { status: *status, body: "upstream failure".into() }),
            }
        }
    }
}
