//! LLM Provider trait

use crate::types::{LlmRequest, StreamDelta};
use futures::{Stream, StreamExt};
use std::pin::Pin;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// LLM error types
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl LlmError {
    /// Map a non-success HTTP status to the matching error variant.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => LlmError::AuthFailed(body),
            429 => LlmError::RateLimited { retry_after_ms: 60_000 },
            _ => LlmError::RequestFailed(format!("{}: {}", status, body)),
        }
    }
}

/// Stream type for LLM responses
pub type LlmStream = Pin<Box<dyn Stream<Item = LlmResult<StreamDelta>> + Send>>;

/// LLM Provider trait
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    fn models(&self) -> &[&str];

    /// Model used when a request leaves `model` empty.
    fn default_model(&self) -> &str;

    fn supports_model(&self, model: &str) -> bool {
        self.models()
            .iter()
            .any(|m| *m == model || model.starts_with(m))
    }

    /// A provider is usable only when its credential is present.
    fn is_available(&self) -> bool;

    /// Stream a completion response.
    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream>;
}

/// Drain a response stream into its full text, trimmed.
///
/// A stream that yields an error fails the whole call; a stream that ends
/// without any text is an invalid response.
pub async fn collect_text(mut stream: LlmStream) -> LlmResult<String> {
    let mut text = String::new();
    while let Some(delta) = stream.next().await {
        match delta? {
            StreamDelta::Text(t) => text.push_str(&t),
            StreamDelta::Done { .. } => break,
            StreamDelta::Error(e) => return Err(LlmError::StreamError(e)),
        }
    }
    let text = text.trim();
    if text.is_empty() {
        return Err(LlmError::InvalidResponse("empty completion".into()));
    }
    Ok(text.to_string())
}
