//! `POST /api/chat` — question about the current estimate.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use canvas::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::services::chat;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatBody {
    /// Kept untyped so a non-string message is a validation error, not a rejection.
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub snapshot: Option<Snapshot>,
}

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatBody>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let message = chat::validate_message(body.message.as_ref())?;
    let llm = state.llm()?;

    let reply = chat::reply(llm.as_ref(), message, body.snapshot.as_ref(), state.config.chat_max_tokens).await?;
    Ok(Json(ChatReply { reply }))
}
