//! The tick loop: wait for new board activity, give every worker one turn in
//! fixed order, advance the global cursor, flush to the observer.

use crate::board::Blackboard;
use crate::feed::Feed;
use crate::window::ContextCursor;
use crate::worker::{TurnOutcome, Worker};
use chalkboard_core::MessageId;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Upper bound on how long the loop sleeps before re-checking the board.
    pub poll_interval: Duration,
    /// Stop after this many passes. `None` runs until cancelled.
    pub max_passes: Option<usize>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            max_passes: None,
        }
    }
}

/// Result of one pass over the workers.
#[derive(Clone, Debug, Default)]
pub struct PassReport {
    /// `(worker name, outcome)` in invitation order.
    pub outcomes: Vec<(String, TurnOutcome)>,
    /// Messages appended during the pass.
    pub appended: usize,
    /// Global cursor after the pass.
    pub cursor: MessageId,
    /// The stop signal arrived before every worker had its turn.
    pub interrupted: bool,
}

impl PassReport {
    pub fn acted(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.acted())
            .map(|(name, _)| name.as_str())
    }
}

pub struct Orchestrator {
    board: Arc<Blackboard>,
    workers: Vec<Worker>,
    feed: Arc<Feed>,
    cursor: ContextCursor,
    config: OrchestratorConfig,
    stop: CancellationToken,
}

impl Orchestrator {
    pub fn new(
        board: Arc<Blackboard>,
        workers: Vec<Worker>,
        feed: Arc<Feed>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            board,
            workers,
            feed,
            cursor: ContextCursor::new(),
            config,
            stop: CancellationToken::new(),
        }
    }

    /// Cancel this token to stop the loop. Honoured before each worker turn,
    /// never in the middle of one.
    pub fn stop_token(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn cursor(&self) -> ContextCursor {
        self.cursor
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Whether the board has grown past the global cursor.
    pub fn has_pending(&self) -> bool {
        self.cursor.has_new(&self.board)
    }

    /// Invite every worker once, then advance the cursor and flush. Output
    /// produced during the pass is covered by the new cursor and does not
    /// trigger another pass on its own. A user message that arrived
    /// mid-pass stops the advance just before it, so the next pass picks it
    /// up.
    pub async fn run_pass(&mut self) -> PassReport {
        let before = self.board.latest_id();
        let mut report = PassReport::default();

        for worker in &self.workers {
            if self.stop.is_cancelled() {
                report.interrupted = true;
                break;
            }
            let outcome = worker.try_act().await;
            debug!(worker = worker.name(), ?outcome, "turn finished");
            report.outcomes.push((worker.name().to_string(), outcome));
        }

        let during = self.board.since(before).await;
        let target = match during.iter().find(|m| m.is_from_user()) {
            Some(user) => user.id - 1,
            None => during.last().map_or(before, |m| m.id),
        };
        report.cursor = self.cursor.advance_to(target);
        report.appended = during.len();
        self.feed.flush(&self.board).await;

        info!(
            cursor = report.cursor,
            appended = report.appended,
            acted = ?report.acted().collect::<Vec<_>>(),
            "pass complete"
        );
        report
    }

    /// Run until the stop token is cancelled or `max_passes` is reached.
    /// Returns the number of passes run.
    pub async fn run(mut self) -> usize {
        let mut wake = self.board.subscribe();
        let mut passes = 0usize;
        info!(workers = self.workers.len(), "orchestrator started");

        loop {
            if self.stop.is_cancelled() {
                break;
            }

            if self.has_pending() {
                let _ = wake.borrow_and_update();
                self.run_pass().await;
                passes += 1;
                if self.config.max_passes.is_some_and(|max| passes >= max) {
                    info!(passes, "pass limit reached");
                    break;
                }
            }

            tokio::select! {
                _ = self.stop.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = wake.changed() => {}
            }
        }

        info!(passes, "orchestrator stopped");
        passes
    }
}
