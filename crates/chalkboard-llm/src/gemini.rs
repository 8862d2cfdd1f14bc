//! Google Gemini provider over the `streamGenerateContent` SSE endpoint

use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::sse::sse_events;
use crate::types::{LlmRequest, StreamDelta, Usage};
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
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

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}:streamGenerateContent?alt=sse", self.base_url.trim_end_matches('/'), model)
    }
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str { "gemini" }

    fn models(&self) -> &[&str] {
        &["gemini-1.5-flash", "gemini-1.5-pro", "gemini-2.0-flash", "gemini-2.5"]
    }

    fn default_model(&self) -> &str { &self.model }

    fn is_available(&self) -> bool { !self.api_key.trim().is_empty() }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        if !self.is_available() {
            return Err(LlmError::NotConfigured("GEMINI_API_KEY".into()));
        }

        let model = if request.model.is_empty() { self.model.clone() } else { request.model };
        let body = GenerateRequest {
            contents: request.messages.into_iter().map(|m| Content {
                role: Some(if m.role == "assistant" { "model".into() } else { "user".into() }),
                parts: vec![Part { text: m.content }],
            }).collect(),
            system_instruction: request.system.map(|s| Content {
                role: None,
                parts: vec![Part { text: s }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens.unwrap_or(self.max_tokens),
                temperature: request.temperature.unwrap_or(self.temperature),
            },
        };

        debug!("Gemini request: model={}", model);

        let response = self.client
            .post(self.endpoint(&model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Gemini error {}: {}", status, error_text);
            return Err(LlmError::from_status(status, error_text));
        }

        Ok(Box::pin(parse_stream(response.bytes_stream())))
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

            let chunk: GenerateChunk = match serde_json::from_str(&event.data) {
                Ok(c) => c,
                Err(e) => {
                    yield Err(LlmError::InvalidResponse(format!("bad chunk: {}", e)));
                    return;
                }
            };

            if let Some(err) = chunk.error {
                yield Err(LlmError::StreamError(err.message));
                return;
            }
            if let Some(meta) = chunk.usage_metadata {
                usage = Some(Usage {
                    input_tokens: meta.prompt_token_count,
                    output_tokens: meta.candidates_token_count,
                });
            }
            for candidate in chunk.candidates {
                if let Some(content) = candidate.content {
                    for part in content.parts {
                        if !part.text.is_empty() {
                            yield Ok(StreamDelta::Text(part.text));
                        }
                    }
                }
                if candidate.finish_reason.is_some() {
                    stop_reason = candidate.finish_reason;
                }
            }
        }

        yield Ok(StreamDelta::Done { stop_reason, usage });
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Deserialize)]
struct ChunkError {
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
    fn candidate_parts_become_text() {
        let out = run(concat!(
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"Cats are\"}]}}]}\r\n\r\n",
            "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\" curious.\"}]},\"finishReason\":\"STOP\"}],",
            "\"usageMetadata\":{\"promptTokenCount\":12,\"candidatesTokenCount\":3}}\r\n\r\n",
        ));
        let text: String = out
            .iter()
            .filter_map(|d| match d {
                Ok(StreamDelta::Text(t)) => Some(t.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(text, "Cats are curious.");
        match out.last() {
            Some(Ok(StreamDelta::Done { stop_reason, usage })) => {
                assert_eq!(stop_reason.as_deref(), Some("STOP"));
                assert_eq!(usage.as_ref().map(|u| u.input_tokens), Some(12));
            }
            other => panic!("Expected Done, got {:?}", other),
        }
    }

    #[test]
    fn endpoint_includes_model_and_sse() {
        let p = GeminiProvider::new("k").with_base_url("http://localhost:9/models/");
        assert_eq!(
            p.endpoint("gemini-1.5-flash"),
            "http://localhost:9/models/gemini-1.5-flash:streamGenerateContent?alt=sse"
        );
    }
}
