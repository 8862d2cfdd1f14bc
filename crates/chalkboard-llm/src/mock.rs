//! Deterministic providers and oracles for tests and offline runs
//!
//! `MockProvider` implements [`LlmProvider`] with canned streamed text and
//! records every request. `MockOracle` implements [`OracleGateway`] directly
//! with scripted judgments and generations, and counts calls.

use crate::oracle::OracleGateway;
use crate::provider::{LlmError, LlmProvider, LlmResult, LlmStream};
use crate::types::{LlmRequest, StreamDelta};
use async_stream::stream;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One scripted answer.
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    Error(String),
}

impl MockReply {
    pub fn text(s: impl Into<String>) -> Self {
        MockReply::Text(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        MockReply::Error(s.into())
    }

    fn into_result(self) -> LlmResult<String> {
        match self {
            MockReply::Text(t) => Ok(t),
            MockReply::Error(e) => Err(LlmError::RequestFailed(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

/// A provider that streams scripted replies. Replies are consumed in order;
/// once exhausted the default reply repeats.
pub struct MockProvider {
    name: String,
    available: bool,
    replies: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    pub fn constant(name: impl Into<String>, reply: MockReply) -> Self {
        Self {
            name: name.into(),
            available: true,
            replies: Mutex::new(VecDeque::new()),
            default_reply: reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn sequence(name: impl Into<String>, replies: Vec<MockReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::constant(name, MockReply::text("(mock: sequence exhausted)"))
        }
    }

    /// A provider whose credential is missing.
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            available: false,
            ..Self::constant(name, MockReply::error("unavailable"))
        }
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self, request: LlmRequest) -> MockReply {
        self.requests.lock().await.push(request);
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn models(&self) -> &[&str] {
        &["mock"]
    }

    fn default_model(&self) -> &str {
        "mock"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn complete_stream(&self, request: LlmRequest) -> LlmResult<LlmStream> {
        let text = self.next_reply(request).await.into_result()?;

        Ok(Box::pin(stream! {
            // Stream word by word like a real provider would.
            let mut first = true;
            for word in text.split(' ') {
                let chunk = if first { word.to_string() } else { format!(" {}", word) };
                first = false;
                yield Ok(StreamDelta::Text(chunk));
            }
            yield Ok(StreamDelta::Done { stop_reason: Some("end_turn".into()), usage: None });
        }))
    }
}

// ---------------------------------------------------------------------------
// MockOracle
// ---------------------------------------------------------------------------

/// A recorded oracle invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum OracleCall {
    Judge { goal: String, worker: String, context: String },
    Generate { instructions: String, context: String, max_words: usize },
}

type JudgeFn = dyn Fn(&str, &str, &str) -> MockReply + Send + Sync;

/// Scripted oracle. Queued replies win; otherwise judgments come from the
/// judge function and generations from the default generation.
pub struct MockOracle {
    judgments: Mutex<VecDeque<MockReply>>,
    generations: Mutex<VecDeque<MockReply>>,
    judge_fn: Arc<JudgeFn>,
    default_generation: MockReply,
    calls: Mutex<Vec<OracleCall>>,
}

impl MockOracle {
    pub fn new(judgment: MockReply, generation: MockReply) -> Self {
        Self {
            judgments: Mutex::new(VecDeque::new()),
            generations: Mutex::new(VecDeque::new()),
            judge_fn: Arc::new(move |_: &str, _: &str, _: &str| judgment.clone()),
            default_generation: generation,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always decides YES and generates `text`.
    pub fn always_yes(text: impl Into<String>) -> Self {
        Self::new(MockReply::text("YES: relevant"), MockReply::text(text))
    }

    /// Always decides NO.
    pub fn always_no() -> Self {
        Self::new(
            MockReply::text("NO: not relevant"),
            MockReply::error("generation should not be reached"),
        )
    }

    /// Judge with a function of `(goal, worker_name, context)`.
    pub fn judging_with<F>(f: F, generation: MockReply) -> Self
    where
        F: Fn(&str, &str, &str) -> MockReply + Send + Sync + 'static,
    {
        Self {
            judge_fn: Arc::new(f),
            ..Self::new(MockReply::text("NO"), generation)
        }
    }

    /// Says NO whenever the context tells this worker (by name) to stop,
    /// YES otherwise.
    pub fn honoring_stop_requests(generation: MockReply) -> Self {
        Self::judging_with(
            |_, worker, context| {
                let told_to_stop = context.lines().any(|line| {
                    let line = line.to_lowercase();
                    line.contains(&worker.to_lowercase())
                        && (line.contains("stop") || line.contains("do not") || line.contains("don't"))
                });
                if told_to_stop {
                    MockReply::text("NO: I was asked to stop")
                } else {
                    MockReply::text("YES: relevant to my goal")
                }
            },
            generation,
        )
    }

    pub async fn push_judgment(&self, reply: MockReply) {
        self.judgments.lock().await.push_back(reply);
    }

    pub async fn push_generation(&self, reply: MockReply) {
        self.generations.lock().await.push_back(reply);
    }

    pub async fn calls(&self) -> Vec<OracleCall> {
        self.calls.lock().await.clone()
    }

    pub async fn judge_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, OracleCall::Judge { .. }))
            .count()
    }

    pub async fn generate_count(&self) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, OracleCall::Generate { .. }))
            .count()
    }
}

#[async_trait::async_trait]
impl OracleGateway for MockOracle {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn judge(&self, goal: &str, worker_name: &str, context: &str) -> LlmResult<String> {
        self.calls.lock().await.push(OracleCall::Judge {
            goal: goal.into(),
            worker: worker_name.into(),
            context: context.into(),
        });
        let queued = self.judgments.lock().await.pop_front();
        queued
            .unwrap_or_else(|| (self.judge_fn)(goal, worker_name, context))
            .into_result()
    }

    async fn generate(
        &self,
        instructions: &str,
        context: &str,
        max_words: usize,
    ) -> LlmResult<String> {
        self.calls.lock().await.push(OracleCall::Generate {
            instructions: instructions.into(),
            context: context.into(),
            max_words,
        });
        let queued = self.generations.lock().await.pop_front();
        queued
            .unwrap_or_else(|| self.default_generation.clone())
            .into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::collect_text;

    #[tokio::test]
    async fn mock_provider_streams_text() {
        let mock = MockProvider::constant("mock", MockReply::text("hello there world"));
        let stream = mock.complete_stream(LlmRequest::user_prompt("hi")).await.unwrap();
        assert_eq!(collect_text(stream).await.unwrap(), "hello there world");
        assert_eq!(mock.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn mock_provider_sequence_exhaustion() {
        let mock = MockProvider::sequence("mock", vec![MockReply::text("first")]);
        let s = mock.complete_stream(LlmRequest::default()).await.unwrap();
        assert_eq!(collect_text(s).await.unwrap(), "first");
        let s = mock.complete_stream(LlmRequest::default()).await.unwrap();
        assert!(collect_text(s).await.unwrap().contains("sequence exhausted"));
    }

    #[tokio::test]
    async fn mock_provider_error() {
        let mock = MockProvider::constant("mock", MockReply::error("API down"));
        let result = mock.complete_stream(LlmRequest::default()).await;
        assert!(matches!(result, Err(LlmError::RequestFailed(m)) if m == "API down"));
    }

    #[tokio::test]
    async fn mock_oracle_queue_then_default() {
        let oracle = MockOracle::always_no();
        oracle.push_judgment(MockReply::text("YES once")).await;
        assert_eq!(oracle.judge("g", "w", "c").await.unwrap(), "YES once");
        assert!(oracle.judge("g", "w", "c").await.unwrap().starts_with("NO"));
        assert_eq!(oracle.judge_count().await, 2);
        assert_eq!(oracle.generate_count().await, 0);
    }

    #[tokio::test]
    async fn honoring_stop_requests_reads_context() {
        let oracle = MockOracle::honoring_stop_requests(MockReply::text("x"));
        let no = oracle
            .judge("g", "writer-agent", "moderator: writer-agent please stop posting")
            .await
            .unwrap();
        assert!(no.starts_with("NO"));
        let yes = oracle
            .judge("g", "editor-agent", "moderator: writer-agent please stop posting")
            .await
            .unwrap();
        assert!(yes.starts_with("YES"));
    }
}
