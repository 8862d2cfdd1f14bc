//! Chalkboard: workers coordinating through a shared append-only board.
//!
//! The library half of the binary: configuration, terminal rendering, the
//! input loop and system wiring. The board, workers and orchestrator live in
//! `chalkboard-agent`; providers and the oracle in `chalkboard-llm`.

pub mod config;
pub mod console;
pub mod display;
pub mod system;

pub use config::AppConfig;
pub use system::{connect, System};
