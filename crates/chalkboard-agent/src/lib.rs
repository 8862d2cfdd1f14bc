//! Chalkboard Agent - Shared blackboard, context windows, workers and the
//! orchestrator tick loop

pub mod board;
pub mod feed;
pub mod orchestrator;
pub mod persona;
pub mod window;
pub mod worker;

pub use board::Blackboard;
pub use feed::{Feed, Observer, RecordingObserver};
pub use orchestrator::{Orchestrator, OrchestratorConfig, PassReport};
pub use persona::{Persona, Roster};
pub use window::{recent_for_decision, render, ContextCursor, NO_MESSAGES};
pub use worker::{did_complete_task, is_affirmative, TurnOutcome, Worker, WorkerConfig};
