use super::*;
use crate::llm::types::MediaSource;

fn image_message() -> Message {
    Message::user_blocks(vec![
        ContentBlock::text("Estimate this floor plan."),
        ContentBlock::Image {
            source: MediaSource { source_type: "base64".into(), media_type: "image/png".into(), data: "AAAA".into() },
        },
    ])
}

// ===== request building =====

#[test]
fn cc_messages_put_system_first_and_image_as_data_url() {
    let msgs = build_chat_completions_messages("Be brief.", &[image_message()]);
    let json = serde_json::to_value(&msgs).unwrap();
    assert_eq!(json[0]["role"], "system");
    assert_eq!(json[0]["content"], "Be brief.");
    assert_eq!(json[1]["content"][0]["type"], "text");
    assert_eq!(json[1]["content"][1]["type"], "image_url");
    assert_eq!(json[1]["content"][1]["image_url"]["url"], "data:image/png;base64,AAAA");
}

#[test]
fn cc_messages_skip_blank_system() {
    let msgs = build_chat_completions_messages("  ", &[Message::user_text("hi")]);
    let json = serde_json::to_value(&msgs).unwrap();
    assert_eq!(json.as_array().map(Vec::len), Some(1));
    assert_eq!(json[0]["content"], "hi");
}

#[test]
fn cc_request_json_mode_sets_response_format() {
    let msgs = build_chat_completions_messages("", &[Message::user_text("hi")]);
    let body = CcRequest { model: "m", max_tokens: 10, messages: &msgs, response_format: Some(JsonObject::new()) };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["response_format"]["type"], "json_object");

    let body = CcRequest { model: "m", max_tokens: 10, messages: &msgs, response_format: None };
    let json = serde_json::to_value(&body).unwrap();
    assert!(json.get("response_format").is_none());
}

#[test]
fn responses_input_uses_input_parts() {
    let input = build_responses_input(&[image_message()]);
    let json = serde_json::to_value(&input).unwrap();
    assert_eq!(json[0]["role"], "user");
    assert_eq!(json[0]["content"][0]["type"], "input_text");
    assert_eq!(json[0]["content"][1]["type"], "input_image");
    assert_eq!(json[0]["content"][1]["image_url"], "data:image/png;base64,AAAA");
}

#[test]
fn responses_input_pdf_becomes_input_file() {
    let msg = Message::user_blocks(vec![ContentBlock::attachment("application/pdf", b"%PDF")]);
    let json = serde_json::to_value(build_responses_input(&[msg])).unwrap();
    assert_eq!(json[0]["content"][0]["type"], "input_file");
    assert!(
        json[0]["content"][0]["file_data"]
            .as_str()
            .unwrap()
            .starts_with("data:application/pdf;base64,")
    );
}

#[test]
fn responses_request_json_mode_sets_text_format() {
    let input = build_responses_input(&[Message::user_text("hi")]);
    let body = RespRequest {
        model: "gpt-4.1-mini",
        max_output_tokens: 100,
        instructions: None,
        input: &input,
        text: Some(RespTextFormat { format: JsonObject::new() }),
    };
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["text"]["format"]["type"], "json_object");
    assert!(json.get("instructions").is_none());
}

// ===== chat completions parsing =====

#[test]
fn cc_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Hello!" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 10, "completion_tokens": 5 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Hello!"));
    assert_eq!(resp.stop_reason, "end_turn");
    assert_eq!(resp.input_tokens, 10);
    assert_eq!(resp.output_tokens, 5);
}

#[test]
fn cc_parse_length_is_max_tokens() {
    let json = serde_json::json!({
        "choices": [{ "message": { "content": "{\"subtotal" }, "finish_reason": "length" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
}

#[test]
fn cc_parse_null_content_is_empty() {
    let json = serde_json::json!({
        "choices": [{ "message": { "content": null }, "finish_reason": "stop" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert!(resp.content.is_empty());
}

#[test]
fn cc_parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-4o", "choices": [] }).to_string();
    assert!(parse_chat_completions_response(&json).is_err());
}

#[test]
fn cc_parse_invalid_json() {
    assert!(matches!(parse_chat_completions_response("not json"), Err(LlmError::ApiParse(_))));
}

// ===== responses parsing =====

#[test]
fn resp_parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-4.1-mini",
        "output": [{
            "type": "message",
            "content": [{ "type": "output_text", "text": "Done!" }]
        }],
        "usage": { "input_tokens": 15, "output_tokens": 8 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Done!"));
    assert_eq!(resp.model, "gpt-4.1-mini");
    assert_eq!(resp.stop_reason, "end_turn");
}

#[test]
fn resp_parse_skips_reasoning_items() {
    let json = serde_json::json!({
        "output": [
            { "type": "reasoning", "summary": [] },
            { "type": "message", "content": [{ "type": "output_text", "text": "{}" }] }
        ]
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.text(), "{}");
}

#[test]
fn resp_parse_output_text_fallback() {
    let json = serde_json::json!({
        "model": "gpt-4.1-mini",
        "output_text": "Fallback text",
        "usage": { "input_tokens": 5, "output_tokens": 3 }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.content.len(), 1);
    assert!(matches!(&resp.content[0], ContentBlock::Text { text } if text == "Fallback text"));
}

#[test]
fn resp_parse_incomplete_is_max_tokens() {
    let json = serde_json::json!({
        "output": [],
        "incomplete_details": { "reason": "max_output_tokens" }
    })
    .to_string();
    let resp = parse_responses_response(&json).unwrap();
    assert_eq!(resp.stop_reason, "max_tokens");
    assert!(resp.content.is_empty());
}
