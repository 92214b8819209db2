//! HTTP error type and the shared error-code trait.
//!
//! Every layer has its own `thiserror` enum. Handlers convert into
//! [`ApiError`], which renders `{error, code, retryable}` JSON with the
//! matching status.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::warn;

use crate::llm::types::LlmError;
use crate::services::chat::ChatError;
use crate::services::estimate::EstimateError;

/// Grepable error code and retryable flag for structured error bodies.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing file")]
    MissingFile,

    #[error("File too large: maximum size is {max_mb} MB")]
    FileTooLarge { max_mb: usize },

    #[error("Missing message")]
    MissingMessage,

    #[error("{0}")]
    BadRequest(String),

    #[error("Multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("AI features are not configured")]
    LlmUnavailable,

    #[error("Model did not return valid JSON")]
    InvalidModelJson { raw: String },

    #[error("AI provider request failed: {0}")]
    Upstream(LlmError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingFile => "E_MISSING_FILE",
            Self::FileTooLarge { .. } => "E_FILE_TOO_LARGE",
            Self::MissingMessage => "E_MISSING_MESSAGE",
            Self::BadRequest(_) => "E_BAD_REQUEST",
            Self::Multipart(_) => "E_MULTIPART",
            Self::LlmUnavailable => "E_LLM_NOT_CONFIGURED",
            Self::InvalidModelJson { .. } => "E_INVALID_MODEL_JSON",
            Self::Upstream(e) => e.error_code(),
            Self::Internal(_) => "E_INTERNAL",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Upstream(e) => e.retryable(),
            Self::InvalidModelJson { .. } => true,
            _ => false,
        }
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingFile | Self::MissingMessage | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Multipart(e) => e.status(),
            Self::LlmUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidModelJson { .. } | Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
    /// Truncated model output, only for [`ApiError::InvalidModelJson`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Provider error body, only for [`ApiError::Upstream`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(code = self.error_code(), error = %self, "request failed");
        }
        let error = self.to_string();
        let code = self.error_code();
        let retryable = self.retryable();
        let (raw, details) = match self {
            Self::InvalidModelJson { raw } => (Some(raw), None),
            Self::Upstream(LlmError::ApiResponse { body, .. }) => (None, Some(body)),
            _ => (None, None),
        };
        let body = ErrorResponse { error, code, retryable, raw, details };
        (status, Json(body)).into_response()
    }
}

impl From<EstimateError> for ApiError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::MissingFile => Self::MissingFile,
            EstimateError::InvalidWastePct(_) => Self::BadRequest(err.to_string()),
            EstimateError::InvalidModelJson { raw } => Self::InvalidModelJson { raw },
            EstimateError::Llm(e) => Self::Upstream(e),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingMessage => Self::MissingMessage,
            ChatError::Encode(e) => Self::Internal(e.to_string()),
            ChatError::Llm(e) => Self::Upstream(e),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
