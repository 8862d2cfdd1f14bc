//! Anthropic Claude API provider with SSE streaming

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::sse::sse_events;
use crate::types::{LlmRequest, StreamDelta, Usage};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-haiku-4-5-20251001";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Fallbacks for requests that leave `max_tokens`/`temperature` unset.
    pub fn with_defaults(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder().timeout(timeout).build().unwrap_or_default();
        self
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str { "anthropic" }

    fn models(&self) -> &[&str] {
        &[
            "claude-opus-4-6",
            "claude-sonnet-4",
            "claude-haiku-4-5",
        ]
    }

    fn default_model(&self) -> &str { &self.model }

    fn is_available(&self) -> bool { !self.api_key.trim().is_empty() }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        if !self.is_available() {
            return Err(LlmError::NotConfigured("ANTHROPIC_API_KEY".into()));
        }

        let model = if request.model.is_empty() { self.model.clone() } else { request.model };
        let body = AnthropicRequest {
            model,
            messages: request.messages.into_iter().map(|m| AnthropicMessage {
                role: m.role,
                content: m.content,
            }).collect(),
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
            stream: true,
            system: request.system,
        };

        debug!("Anthropic request: model={}", body.model);

        let response = self.client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Anthropic error {}: {}", status, error_text);
            return Err(LlmError::from_status(status, error_text));
        }

        let stream = parse_stream(response.bytes_stream());
        Ok(Box::pin(stream))
    }
}

fn parse_stream(
    bytes_stream: impl futures::Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl futures::Stream<Item = LlmResult<StreamDelta>> + Send {
    async_stream::stream! {
        let events = sse_events(bytes_stream);
        tokio::pin!(events);

        let mut stop_reason: Option<String> = None;
        let mut usage: Option<Usage> = None;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(e) => e,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            match event.event.as_str() {
                "content_block_delta" => {
                    if let Ok(data) = serde_json::from_str::<ContentBlockDelta>(&event.data) {
                        if let DeltaType::TextDelta { text } = data.delta {
                            yield Ok(StreamDelta::Text(text));
                        }
                    }
                }
                "message_delta" => {
                    if let Ok(data) = serde_json::from_str::<MessageDelta>(&event.data) {
                        if let Some(reason) = data.delta.stop_reason {
                            debug!("Message complete: stop_reason={}", reason);
                            stop_reason = Some(reason);
                        }
                        usage = data.usage;
                    }
                }
                "message_stop" => {
                    yield Ok(StreamDelta::Done {
                        stop_reason: stop_reason.take().or_else(|| Some("end_turn".to_string())),
                        usage: usage.take(),
                    });
                    return;
                }
                "error" => {
                    if let Ok(data) = serde_json::from_str::<ErrorEvent>(&event.data) {
                        yield Err(LlmError::StreamError(data.error.message));
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ContentBlockDelta {
    delta: DeltaType,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum DeltaType {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct MessageDelta {
    delta: MessageDeltaContent,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct MessageDeltaContent {
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEvent {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(body: &'static str) -> Vec<LlmResult<StreamDelta>> {
        let bytes = futures::stream::iter(vec![Ok::<_, reqwest::Error>(bytes::Bytes::from_static(
            body.as_bytes(),
        ))]);
        futures::executor::block_on(parse_stream(bytes).collect::<Vec<_>>())
    }

    #[test]
    fn text_deltas_then_done() {
        let out = run(concat!(
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"YES\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\": relevant\"}}\n\n",
            "event: message_delta\n",
            "data: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"input_tokens\":0,\"output_tokens\":4}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        ));
        let text: String = out
            .iter()
            .filter_map(|d| match d {
                Ok(StreamDelta::Text(t)) => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "YES: relevant");
        match out.last() {
            Some(Ok(StreamDelta::Done { stop_reason, usage })) => {
                assert_eq!(stop_reason.as_deref(), Some("end_turn"));
                assert_eq!(usage.as_ref().map(|u| u.output_tokens), Some(4));
            }
            other => panic!("Expected Done, got {:?}", other),
        }
    }

    #[test]
    fn error_event_fails_stream() {
        let out = run(concat!(
            "event: error\n",
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
        ));
        assert_eq!(out.len(), 1);
        assert!(matches!(&out[0], Err(LlmError::StreamError(m)) if m == "Overloaded"));
    }

    #[test]
    fn empty_key_is_unavailable() {
        assert!(!AnthropicProvider::new("").is_available());
        assert!(AnthropicProvider::new("sk-ant-x").is_available());
    }
}
