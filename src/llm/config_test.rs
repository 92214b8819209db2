use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_to_openai_responses() {
    let cfg = LlmConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::OpenAi);
    assert_eq!(cfg.model, "gpt-4.1-mini");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::Responses);
    assert_eq!(cfg.openai_base_url, DEFAULT_OPENAI_BASE_URL);
    assert_eq!(
        cfg.timeouts,
        LlmTimeouts { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    );
    assert_eq!(cfg.api_key, "sk-test");
}

#[test]
fn anthropic_uses_its_own_key_var_and_model() {
    let cfg =
        LlmConfig::from_lookup(lookup(&[("LLM_PROVIDER", "anthropic"), ("ANTHROPIC_API_KEY", "secret")])).unwrap();
    assert_eq!(cfg.provider, LlmProviderKind::Anthropic);
    assert_eq!(cfg.model, "claude-sonnet-4-5-20250929");
    assert_eq!(cfg.api_key, "secret");
}

#[test]
fn key_env_override_and_other_overrides() {
    let cfg = LlmConfig::from_lookup(lookup(&[
        ("LLM_API_KEY_ENV", "TEST_KEY"),
        ("TEST_KEY", "secret"),
        ("LLM_MODEL", "gpt-4o"),
        ("LLM_OPENAI_MODE", "chat_completions"),
        ("LLM_OPENAI_BASE_URL", "https://example.test/v1/"),
        ("LLM_REQUEST_TIMEOUT_SECS", "42"),
        ("LLM_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.api_key, "secret");
    assert_eq!(cfg.model, "gpt-4o");
    assert_eq!(cfg.openai_mode, OpenAiApiMode::ChatCompletions);
    assert_eq!(cfg.openai_base_url, "https://example.test/v1");
    assert_eq!(cfg.timeouts, LlmTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn unparseable_timeout_falls_back_to_default() {
    let cfg =
        LlmConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), ("LLM_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_LLM_REQUEST_TIMEOUT_SECS);
}

#[test]
fn missing_key_names_the_variable() {
    let err = LlmConfig::from_lookup(lookup(&[])).unwrap_err();
    match err {
        LlmError::MissingApiKey { var } => assert_eq!(var, "OPENAI_API_KEY"),
        other => panic!("expected MissingApiKey, got {other:?}"),
    }
}

#[test]
fn blank_key_counts_as_missing() {
    let err = LlmConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
    assert!(matches!(err, LlmError::MissingApiKey { .. }));
}

#[test]
fn unknown_provider_errors() {
    let err = LlmConfig::from_lookup(lookup(&[("LLM_PROVIDER", "bad"), ("OPENAI_API_KEY", "k")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("unknown LLM_PROVIDER"));
}

#[test]
fn unknown_openai_mode_errors() {
    let err = LlmConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "k"), ("LLM_OPENAI_MODE", "bad_mode")]))
        .unwrap_err()
        .to_string();
    assert!(err.contains("unsupported openai_api mode"));
}
