//! Chalkboard LLM - Provider adapters and the oracle gateway workers consult

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod oracle;
pub mod prompt;
pub mod provider;
pub mod select;
mod sse;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use oracle::{LlmOracle, OracleGateway, OracleSettings};
pub use provider::{collect_text, LlmError, LlmProvider, LlmResult, LlmStream};
pub use select::select_provider;
pub use types::*;
