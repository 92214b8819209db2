//! OpenAI-compatible API client.
//!
//! Supports both `/v1/chat/completions` and `/v1/responses`. Image and PDF
//! blocks become `data:` URL parts; [`ResponseFormat::Json`] maps to the
//! provider's `json_object` output mode.

use serde::Serialize;
use serde_json::Value;

use super::config::{LlmTimeouts, OpenAiApiMode};
use super::http;
use super::types::{ChatResponse, Content, ContentBlock, LlmError, Message, ResponseFormat};

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    mode: OpenAiApiMode,
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(
        api_key: String,
        mode: OpenAiApiMode,
        base_url: String,
        timeouts: LlmTimeouts,
    ) -> Result<Self, LlmError> {
        Ok(Self { http: http::client(timeouts)?, api_key, base_url, mode })
    }

    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is malformed.
    pub async fn chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<ChatResponse, LlmError> {
        match self.mode {
            OpenAiApiMode::ChatCompletions => {
                self.chat_completions(model, max_tokens, system, messages, format)
                    .await
            }
            OpenAiApiMode::Responses => self.responses(model, max_tokens, system, messages, format).await,
        }
    }

    async fn chat_completions(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<ChatResponse, LlmError> {
        let msgs = build_chat_completions_messages(system, messages);
        let response_format = (format == ResponseFormat::Json).then_some(JsonObject::new());
        let body = CcRequest { model, max_tokens, messages: &msgs, response_format };
        let text = self.send_json("/chat/completions", &body).await?;
        parse_chat_completions_response(&text)
    }

    async fn responses(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
        format: ResponseFormat,
    ) -> Result<ChatResponse, LlmError> {
        let input = build_responses_input(messages);
        let text_format = (format == ResponseFormat::Json).then(|| RespTextFormat { format: JsonObject::new() });
        let body = RespRequest {
            model,
            max_output_tokens: max_tokens,
            instructions: (!system.trim().is_empty()).then_some(system),
            input: &input,
            text: text_format,
        };
        let text = self.send_json("/responses", &body).await?;
        parse_responses_response(&text)
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        http::send(self.http.post(url).bearer_auth(&self.api_key).json(body)).await
    }
}

#[derive(Serialize)]
struct JsonObject {
    #[serde(rename = "type")]
    format_type: &'static str,
}

impl JsonObject {
    fn new() -> Self {
        Self { format_type: "json_object" }
    }
}

// =============================================================================
// CHAT COMPLETIONS — wire types
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [CcMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<JsonObject>,
}

#[derive(Serialize)]
struct CcMessage {
    role: String,
    content: CcContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CcContent {
    Text(String),
    Parts(Vec<CcPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum CcPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: CcImageUrl },
    #[serde(rename = "file")]
    File { file: CcFile },
}

#[derive(Debug, Serialize)]
struct CcImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct CcFile {
    filename: String,
    file_data: String,
}

fn build_chat_completions_messages(system: &str, messages: &[Message]) -> Vec<CcMessage> {
    let mut out = Vec::new();
    if !system.trim().is_empty() {
        out.push(CcMessage { role: "system".to_string(), content: CcContent::Text(system.to_string()) });
    }
    for message in messages {
        let content = match &message.content {
            Content::Text(text) => CcContent::Text(text.clone()),
            Content::Blocks(blocks) => {
                let parts: Vec<CcPart> = blocks
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(CcPart::Text { text: text.clone() }),
                        ContentBlock::Image { source } => {
                            Some(CcPart::ImageUrl { image_url: CcImageUrl { url: source.data_url() } })
                        }
                        ContentBlock::Document { source } => Some(CcPart::File {
                            file: CcFile { filename: "blueprint.pdf".to_string(), file_data: source.data_url() },
                        }),
                        ContentBlock::Unknown => None,
                    })
                    .collect();
                if parts.is_empty() {
                    continue;
                }
                CcContent::Parts(parts)
            }
        };
        out.push(CcMessage { role: message.role.clone(), content });
    }
    out
}

// =============================================================================
// RESPONSES — wire types
// =============================================================================

#[derive(Serialize)]
struct RespRequest<'a> {
    model: &'a str,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    input: &'a [RespInputItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<RespTextFormat>,
}

#[derive(Serialize)]
struct RespTextFormat {
    format: JsonObject,
}

#[derive(Serialize)]
struct RespInputItem {
    role: String,
    content: Vec<RespPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum RespPart {
    #[serde(rename = "input_text")]
    InputText { text: String },
    #[serde(rename = "input_image")]
    InputImage { image_url: String },
    #[serde(rename = "input_file")]
    InputFile { filename: String, file_data: String },
}

fn build_responses_input(messages: &[Message]) -> Vec<RespInputItem> {
    let mut out = Vec::new();
    for message in messages {
        let content: Vec<RespPart> = match &message.content {
            Content::Text(text) => vec![RespPart::InputText { text: text.clone() }],
            Content::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(RespPart::InputText { text: text.clone() }),
                    ContentBlock::Image { source } => Some(RespPart::InputImage { image_url: source.data_url() }),
                    ContentBlock::Document { source } => Some(RespPart::InputFile {
                        filename: "blueprint.pdf".to_string(),
                        file_data: source.data_url(),
                    }),
                    ContentBlock::Unknown => None,
                })
                .collect(),
        };
        if !content.is_empty() {
            out.push(RespInputItem { role: message.role.clone(), content });
        }
    }
    out
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

fn usage(root: &Value, key: &str) -> u64 {
    root.get("usage")
        .and_then(|u| u.get(key))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

fn model_of(root: &Value) -> String {
    root.get("model")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default()
}

pub(crate) fn parse_chat_completions_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::ApiParse("chat_completions: missing choices[0]".to_string()));
    };
    let finish_reason = choice
        .get("finish_reason")
        .and_then(Value::as_str)
        .unwrap_or("stop");

    let mut content = Vec::new();
    if let Some(text) = choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        && !text.is_empty()
    {
        content.push(ContentBlock::text(text));
    }

    let stop_reason = if finish_reason == "length" { "max_tokens" } else { "end_turn" };

    Ok(ChatResponse {
        content,
        model: model_of(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage(&root, "prompt_tokens"),
        output_tokens: usage(&root, "completion_tokens"),
    })
}

pub(crate) fn parse_responses_response(json_text: &str) -> Result<ChatResponse, LlmError> {
    let root: Value = serde_json::from_str(json_text).map_err(|e| LlmError::ApiParse(e.to_string()))?;

    let mut content = Vec::new();
    if let Some(items) = root.get("output").and_then(Value::as_array) {
        let parts = items
            .iter()
            .filter(|item| item.get("type").and_then(Value::as_str) == Some("message"))
            .filter_map(|item| item.get("content").and_then(Value::as_array))
            .flatten();
        for part in parts {
            let kind = part.get("type").and_then(Value::as_str);
            let text = part
                .get("text")
                .or_else(|| part.get("output_text"))
                .and_then(Value::as_str)
                .unwrap_or("");
            if matches!(kind, Some("output_text" | "text")) && !text.is_empty() {
                content.push(ContentBlock::text(text));
            }
        }
    }
    if content.is_empty()
        && let Some(output_text) = root.get("output_text").and_then(Value::as_str)
        && !output_text.is_empty()
    {
        content.push(ContentBlock::text(output_text));
    }

    let truncated = root
        .get("incomplete_details")
        .and_then(|d| d.get("reason"))
        .and_then(Value::as_str)
        == Some("max_output_tokens");
    let stop_reason = if truncated { "max_tokens" } else { "end_turn" };

    Ok(ChatResponse {
        content,
        model: model_of(&root),
        stop_reason: stop_reason.to_string(),
        input_tokens: usage(&root, "input_tokens"),
        output_tokens: usage(&root, "output_tokens"),
    })
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
