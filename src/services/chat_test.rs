use canvas::selection::ShapeKind;
use canvas::snapshot::{RealMeasurement, SnapshotEntry};
use serde_json::json;

use super::*;
use crate::llm::types::Content;
use crate::state::test_helpers::MockLlm;

fn kitchen_snapshot() -> Snapshot {
    Snapshot {
        total_sq_ft: 120.0,
        selections_count: 1,
        selections: vec![SnapshotEntry {
            label: "Kitchen".into(),
            kind: ShapeKind::Rect,
            area_sq_ft: 120.0,
            real: RealMeasurement::Rect { width_ft: 12.0, height_ft: 10.0 },
        }],
        calibrated: None,
    }
}

// =========================================================================
// validate_message
// =========================================================================

#[test]
fn message_must_be_non_blank_string() {
    assert_eq!(validate_message(Some(&json!("How many boxes?"))).unwrap(), "How many boxes?");
    assert!(matches!(validate_message(None), Err(ChatError::MissingMessage)));
    assert!(matches!(validate_message(Some(&json!("   "))), Err(ChatError::MissingMessage)));
    assert!(matches!(validate_message(Some(&json!(42))), Err(ChatError::MissingMessage)));
    assert!(matches!(validate_message(Some(&Value::Null)), Err(ChatError::MissingMessage)));
}

// =========================================================================
// build_user_prompt
// =========================================================================

#[test]
fn prompt_includes_question_and_pretty_snapshot() {
    let prompt = build_user_prompt("What is the total?", Some(&kitchen_snapshot())).unwrap();
    assert!(prompt.starts_with("User question:\nWhat is the total?\n\nEstimator snapshot (read-only):\n{"));
    assert!(prompt.contains("\"totalSqFt\": 120.0"));
    assert!(prompt.contains("\"label\": \"Kitchen\""));
    assert!(prompt.contains("\"widthFt\": 12.0"));
}

#[test]
fn prompt_without_snapshot_uses_empty_object() {
    let prompt = build_user_prompt("hi", None).unwrap();
    assert!(prompt.ends_with("Estimator snapshot (read-only):\n{}"));
}

// =========================================================================
// reply (with MockLlm)
// =========================================================================

#[tokio::test]
async fn reply_returns_model_text() {
    let mock = MockLlm::replying("  About 12 boxes.\n");
    let text = reply(&mock, "How many boxes?", Some(&kitchen_snapshot()), 1024)
        .await
        .unwrap();
    assert_eq!(text, "About 12 boxes.");

    let call = mock.last_call();
    assert_eq!(call.max_tokens, 1024);
    assert_eq!(call.format, ResponseFormat::Text);
    assert!(call.system.is_empty());
    match &call.messages[0].content {
        Content::Text(prompt) => assert!(prompt.contains("How many boxes?")),
        other => panic!("expected text content, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_reply_uses_fallback() {
    let mock = MockLlm::replying("");
    let text = reply(&mock, "hello", None, 100).await.unwrap();
    assert_eq!(text, NO_REPLY);
}

#[tokio::test]
async fn provider_failure_propagates() {
    let mock = MockLlm::failing(401);
    let err = reply(&mock, "hello", None, 100).await.unwrap_err();
    assert!(matches!(err, ChatError::Llm(LlmError::ApiResponse { status: 401, .. })));
    assert_eq!(err.error_code(), "E_LLM_ERROR");
    assert!(!err.retryable());
}
