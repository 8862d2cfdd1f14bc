//! Oracle gateway - the judgment/generation capability workers consult

use crate::prompt::{decision_prompt, generation_prompt};
use crate::provider::{collect_text, LlmProvider, LlmResult};
use crate::types::LlmRequest;
use std::sync::Arc;
use tracing::{debug, info};

/// External judgment capability. Implementations must accept the same
/// rendered inputs whatever backs them.
#[async_trait::async_trait]
pub trait OracleGateway: Send + Sync {
    /// Name of the backing provider, for banners and logs.
    fn provider_name(&self) -> &str;

    /// Answer whether `worker_name` should act on `context`. Free text,
    /// expected to start with YES or NO.
    async fn judge(&self, goal: &str, worker_name: &str, context: &str) -> LlmResult<String>;

    /// Produce a contribution following `instructions`.
    async fn generate(&self, instructions: &str, context: &str, max_words: usize)
        -> LlmResult<String>;
}

/// Sampling parameters for the two call kinds.
#[derive(Clone, Debug)]
pub struct OracleSettings {
    /// Model override; empty uses the provider default.
    pub model: String,
    pub decision_max_tokens: u32,
    pub decision_temperature: f32,
    pub generation_temperature: f32,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            decision_max_tokens: 50,
            decision_temperature: 0.1,
            generation_temperature: 0.7,
        }
    }
}

/// Oracle backed by one selected [`LlmProvider`].
pub struct LlmOracle {
    provider: Arc<dyn LlmProvider>,
    settings: OracleSettings,
}

impl LlmOracle {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self::with_settings(provider, OracleSettings::default())
    }

    pub fn with_settings(provider: Arc<dyn LlmProvider>, settings: OracleSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &OracleSettings {
        &self.settings
    }

    async fn complete(&self, request: LlmRequest) -> LlmResult<String> {
        let request = request.with_model(self.settings.model.clone());
        let stream = self.provider.complete_stream(request).await?;
        collect_text(stream).await
    }
}

#[async_trait::async_trait]
impl OracleGateway for LlmOracle {
    fn provider_name(&self) -> &str {
        self.provider.name()
    }

    async fn judge(&self, goal: &str, worker_name: &str, context: &str) -> LlmResult<String> {
        let prompt = decision_prompt(goal, worker_name, context);
        info!(target: "prompts", worker = worker_name, "DECISION PROMPT:\n{}", prompt);

        let request = LlmRequest::user_prompt(prompt)
            .with_max_tokens(self.settings.decision_max_tokens)
            .with_temperature(self.settings.decision_temperature);
        let response = self.complete(request).await?;

        info!(target: "prompts", worker = worker_name, "DECISION RESPONSE: {}", response);
        Ok(response)
    }

    async fn generate(
        &self,
        instructions: &str,
        context: &str,
        max_words: usize,
    ) -> LlmResult<String> {
        let prompt = generation_prompt(instructions, context, max_words);
        info!(target: "prompts", "PROCESSING PROMPT:\n{}", prompt);

        // Roughly two tokens per word leaves room for the ceiling.
        let max_tokens = u32::try_from(max_words.saturating_mul(2)).unwrap_or(u32::MAX);
        let request = LlmRequest::user_prompt(prompt)
            .with_max_tokens(max_tokens)
            .with_temperature(self.settings.generation_temperature);
        let response = self.complete(request).await?;

        debug!(provider = self.provider.name(), words = response.split_whitespace().count(), "generated");
        info!(target: "prompts", "PROCESSING RESPONSE: {}", response);
        Ok(response)
    }
}
