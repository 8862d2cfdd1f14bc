//! Tests for chalkboard-llm: request types, provider selection, the LLM-backed
//! oracle, and live provider integration when a key is present

use chalkboard_core::Error;
use chalkboard_llm::mock::{MockProvider, MockReply};
use chalkboard_llm::*;
use std::sync::Arc;

// ===========================================================================
// LlmRequest
// ===========================================================================

#[test]
fn llm_request_default() {
    let req = LlmRequest::default();
    assert!(req.model.is_empty());
    assert!(req.messages.is_empty());
    assert!(req.max_tokens.is_none());
    assert!(req.temperature.is_none());
    assert!(req.system.is_none());
}

#[test]
fn llm_request_user_prompt_builder() {
    let req = LlmRequest::user_prompt("hello")
        .with_max_tokens(50)
        .with_temperature(0.1)
        .with_model("gpt-4o");
    assert_eq!(req.messages, vec![LlmMessage::user("hello")]);
    assert_eq!(req.max_tokens, Some(50));
    assert_eq!(req.temperature, Some(0.1));
    assert_eq!(req.model, "gpt-4o");
}

#[test]
fn llm_request_skips_unset_fields() {
    let json = serde_json::to_string(&LlmRequest::user_prompt("hi")).unwrap();
    assert!(!json.contains("max_tokens"));
    assert!(!json.contains("temperature"));
    assert!(!json.contains("system"));
}

// ===========================================================================
// Usage
// ===========================================================================

#[test]
fn usage_serde() {
    let u = Usage { input_tokens: 100, output_tokens: 50 };
    let json = serde_json::to_string(&u).unwrap();
    let back: Usage = serde_json::from_str(&json).unwrap();
    assert_eq!(back.input_tokens, 100);
    assert_eq!(back.output_tokens, 50);
}

// ===========================================================================
// collect_text
// ===========================================================================

#[tokio::test]
async fn collect_text_rejects_empty_completion() {
    let mock = MockProvider::constant("mock", MockReply::text("   "));
    let stream = mock.complete_stream(LlmRequest::default()).await.unwrap();
    let result = collect_text(stream).await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

// ===========================================================================
// select_provider
// ===========================================================================

fn candidates(available: &[(&str, bool)]) -> Vec<Arc<dyn LlmProvider>> {
    available
        .iter()
        .map(|(name, ok)| {
            let p: Arc<dyn LlmProvider> = if *ok {
                Arc::new(MockProvider::constant(*name, MockReply::text("ok")))
            } else {
                Arc::new(MockProvider::unavailable(*name))
            };
            p
        })
        .collect()
}

#[test]
fn select_prefers_configured_provider() {
    let chosen = select_provider("gemini", candidates(&[("openai", true), ("gemini", true)])).unwrap();
    assert_eq!(chosen.name(), "gemini");
}

#[test]
fn select_is_case_insensitive() {
    let chosen = select_provider(" OpenAI ", candidates(&[("openai", true), ("gemini", true)])).unwrap();
    assert_eq!(chosen.name(), "openai");
}

#[test]
fn select_falls_back_to_first_available() {
    let chosen = select_provider(
        "openai",
        candidates(&[("openai", false), ("gemini", false), ("anthropic", true)]),
    )
    .unwrap();
    assert_eq!(chosen.name(), "anthropic");
}

#[test]
fn select_unknown_name_falls_back() {
    let chosen = select_provider("llama", candidates(&[("openai", false), ("gemini", true)])).unwrap();
    assert_eq!(chosen.name(), "gemini");
}

#[test]
fn select_fails_when_nothing_available() {
    let err = select_provider("openai", candidates(&[("openai", false), ("gemini", false)]))
        .err()
        .expect("selection should fail");
    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("No LLM provider"));
}

#[test]
fn real_providers_without_keys_are_unavailable() {
    let providers: Vec<Arc<dyn LlmProvider>> = vec![
        Arc::new(OpenAiProvider::new("")),
        Arc::new(GeminiProvider::new("")),
        Arc::new(AnthropicProvider::new("")),
    ];
    assert!(select_provider("openai", providers).is_err());
}

#[test]
fn provider_supports_model_prefix() {
    let provider = OpenAiProvider::new("fake");
    assert!(provider.supports_model("gpt-4o-mini"));
    assert!(!provider.supports_model("claude-haiku-4-5"));
    let provider = AnthropicProvider::new("fake");
    assert!(provider.supports_model("claude-haiku-4-5-20251001"));
}

// ===========================================================================
// LlmOracle over a mock provider
// ===========================================================================

#[tokio::test]
async fn oracle_judge_uses_decision_settings() {
    let provider = Arc::new(MockProvider::constant("mock", MockReply::text("YES: relevant")));
    let oracle = LlmOracle::new(provider.clone());

    let answer = oracle
        .judge("Create article drafts", "writer-agent", "user: Write about cats")
        .await
        .unwrap();
    assert_eq!(answer, "YES: relevant");

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, Some(50));
    assert_eq!(requests[0].temperature, Some(0.1));
    let prompt = &requests[0].messages[0].content;
    assert!(prompt.contains("Your agent name is: writer-agent"));
    assert!(prompt.contains("user: Write about cats"));
}

#[tokio::test]
async fn oracle_generate_uses_generation_settings() {
    let provider = Arc::new(MockProvider::constant("mock", MockReply::text("  A draft.  ")));
    let oracle = LlmOracle::with_settings(
        provider.clone(),
        OracleSettings { model: "gpt-4o".into(), ..Default::default() },
    );

    let text = oracle.generate("You are a writer.", "user: cats", 100).await.unwrap();
    assert_eq!(text, "A draft.");

    let requests = provider.requests().await;
    assert_eq!(requests[0].max_tokens, Some(200));
    assert_eq!(requests[0].temperature, Some(0.7));
    assert_eq!(requests[0].model, "gpt-4o");
    assert!(requests[0].messages[0].content.contains("under 100 words"));
}

#[tokio::test]
async fn oracle_propagates_provider_errors() {
    let provider = Arc::new(MockProvider::constant("mock", MockReply::error("timeout")));
    let oracle = LlmOracle::new(provider);
    assert!(oracle.judge("g", "w", "c").await.is_err());
    assert_eq!(oracle.provider_name(), "mock");
}

// ===========================================================================
// Live providers, skipped without credentials
// ===========================================================================

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

#[tokio::test]
async fn openai_provider_simple_text_response() {
    let api_key = match env_key("OPENAI_API_KEY") {
        Some(k) => k,
        None => { eprintln!("SKIP: no OPENAI_API_KEY"); return; }
    };

    let oracle = LlmOracle::new(Arc::new(OpenAiProvider::new(api_key)));
    let answer = oracle
        .generate("Reply with exactly the word 'pong' and nothing else.", "user: ping", 5)
        .await
        .expect("API call failed");
    assert!(answer.to_lowercase().contains("pong"), "got: {}", answer);
}

#[tokio::test]
async fn anthropic_provider_bad_key_fails() {
    if env_key("CHALKBOARD_LIVE_TESTS").is_none() {
        eprintln!("SKIP: CHALKBOARD_LIVE_TESTS not set");
        return;
    }
    let provider = AnthropicProvider::new("sk-bad-key-12345");
    let result = provider.complete_stream(LlmRequest::user_prompt("hello").with_max_tokens(16)).await;
    assert!(result.is_err(), "Expected error with bad API key");
}
