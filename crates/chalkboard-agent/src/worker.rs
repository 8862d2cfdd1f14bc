//! A worker: one persona running the decide-then-act turn
//!
//! Each turn moves Idle → Deciding → (Acting | Idle). The worker keeps no
//! cursor of its own; it always looks at the last `window_size` messages and
//! relies on the judgment step to suppress repeated action on the same tail.

use crate::board::Blackboard;
use crate::persona::Persona;
use crate::window::{recent_for_decision, render};
use chalkboard_core::{Sender, SYSTEM_SENDER};
use chalkboard_llm::OracleGateway;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Phrases that mark a reply as a request for input rather than the work.
pub const DEFLECTION_PHRASES: [&str; 7] = [
    "please share",
    "please provide",
    "certainly!",
    "i'll help",
    "i will help",
    "send me",
    "give me",
];

/// Replies shorter than this are treated as generic.
pub const MIN_COMPLETED_WORDS: usize = 20;

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// How many recent messages the worker sees when deciding.
    pub window_size: usize,
    /// Word ceiling passed to generation.
    pub max_words: usize,
    /// Post a system "is working" notice before generating.
    pub announce_work: bool,
    /// Post negative decisions to the board.
    pub debug_decisions: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            window_size: 5,
            max_words: 100,
            announce_work: true,
            debug_decisions: false,
        }
    }
}

/// What happened during one invitation.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    /// Nothing on the board; the oracle was not consulted.
    NoContext,
    /// The judgment said no (or failed).
    Declined { reason: String },
    /// A contribution was posted. `handed_off` is true when the completion
    /// notice followed it.
    Acted { handed_off: bool },
    /// Generation failed and an error marker was posted instead.
    Failed { error: String },
}

impl TurnOutcome {
    pub fn acted(&self) -> bool {
        matches!(self, TurnOutcome::Acted { .. })
    }
}

/// True iff the judgment starts with YES, ignoring case and leading space.
pub fn is_affirmative(response: &str) -> bool {
    response
        .trim_start()
        .get(..3)
        .is_some_and(|head| head.eq_ignore_ascii_case("yes"))
}

/// Whether generated text looks like the actual work rather than a
/// deflection or a generic one-liner.
pub fn did_complete_task(text: &str) -> bool {
    let lower = text.to_lowercase();
    if DEFLECTION_PHRASES.iter().any(|p| lower.contains(p)) {
        return false;
    }
    text.split_whitespace().count() >= MIN_COMPLETED_WORDS
}

pub struct Worker {
    persona: Persona,
    sender: Sender,
    board: Arc<Blackboard>,
    oracle: Arc<dyn OracleGateway>,
    config: WorkerConfig,
}

impl Worker {
    pub fn new(
        persona: Persona,
        board: Arc<Blackboard>,
        oracle: Arc<dyn OracleGateway>,
        config: WorkerConfig,
    ) -> Self {
        let sender = Sender::new(persona.name.clone());
        Self { persona, sender, board, oracle, config }
    }

    pub fn name(&self) -> &str {
        &self.persona.name
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run one turn. Never fails: oracle errors degrade to a decline or an
    /// inline error marker.
    pub async fn try_act(&self) -> TurnOutcome {
        let messages = recent_for_decision(&self.board, self.config.window_size).await;
        if messages.is_empty() {
            debug!(worker = self.name(), "no context, staying idle");
            return TurnOutcome::NoContext;
        }
        let context = render(&messages);

        match self.decide(&context).await {
            Decision::Act => self.act(&context).await,
            Decision::Decline(reason) => TurnOutcome::Declined { reason },
        }
    }

    async fn decide(&self, context: &str) -> Decision {
        let response = match self
            .oracle
            .judge(&self.persona.goal, &self.persona.name, context)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(worker = self.name(), error = %e, "decision failed, not acting");
                return Decision::Decline(format!("decision error: {}", e));
            }
        };

        if is_affirmative(&response) {
            info!(worker = self.name(), response = %response, "decided to act");
            return Decision::Act;
        }

        debug!(worker = self.name(), response = %response, "decided not to act");
        if self.config.debug_decisions {
            self.board
                .append(SYSTEM_SENDER, format!("DECISION ({}): {}", self.name(), response))
                .await;
        }
        Decision::Decline(response)
    }

    async fn act(&self, context: &str) -> TurnOutcome {
        if self.config.announce_work {
            self.board
                .append(
                    SYSTEM_SENDER,
                    format!("🤖 {} is working on this task...", self.name()),
                )
                .await;
        }

        let text = match self
            .oracle
            .generate(&self.persona.prompt, context, self.config.max_words)
            .await
        {
            Ok(t) => t,
            Err(e) => {
                warn!(worker = self.name(), error = %e, "generation failed");
                self.board
                    .append(self.sender.clone(), format!("Error processing text: {}", e))
                    .await;
                return TurnOutcome::Failed { error: e.to_string() };
            }
        };

        self.board.append(self.sender.clone(), text.as_str()).await;

        let handed_off =
            did_complete_task(&text) && !self.persona.completion_message.is_empty();
        if handed_off {
            self.board
                .append(self.sender.clone(), self.persona.completion_message.as_str())
                .await;
        } else {
            debug!(worker = self.name(), "no hand-off notice");
        }
        TurnOutcome::Acted { handed_off }
    }
}

enum Decision {
    Act,
    Decline(String),
}
