//! Wiring: one board, one oracle, the roster's workers, an observer feed and
//! the orchestrator that drives them.

use crate::config::AppConfig;
use chalkboard_agent::{Blackboard, Feed, Observer, Orchestrator, PassReport, Worker};
use chalkboard_core::{Result, USER_SENDER};
use chalkboard_llm::{select_provider, LlmOracle, OracleGateway, OracleSettings};
use std::sync::Arc;
use tracing::info;

pub struct System {
    pub board: Arc<Blackboard>,
    pub feed: Arc<Feed>,
    pub orchestrator: Orchestrator,
    pub provider: String,
}

/// Pick a provider from the configuration and wrap it as an oracle.
pub fn connect(config: &AppConfig) -> Result<Arc<dyn OracleGateway>> {
    config.require_credentials()?;
    let provider = select_provider(&config.provider, config.providers())?;
    let mut settings = OracleSettings::default();
    if let Some(p) = config.provider_config(provider.name()) {
        settings.model = p.model.clone();
        settings.generation_temperature = p.temperature;
    }
    Ok(Arc::new(LlmOracle::with_settings(provider, settings)))
}

impl System {
    pub fn assemble(
        config: &AppConfig,
        oracle: Arc<dyn OracleGateway>,
        observer: impl Observer + 'static,
    ) -> Self {
        let board = Arc::new(Blackboard::new());
        let feed = Arc::new(Feed::new(observer));
        let worker_config = config.worker_config();
        let workers: Vec<Worker> = config
            .personas()
            .into_iter()
            .map(|p| Worker::new(p, board.clone(), oracle.clone(), worker_config.clone()))
            .collect();
        info!(
            roster = %config.roster,
            workers = workers.len(),
            provider = oracle.provider_name(),
            "system assembled"
        );
        let orchestrator = Orchestrator::new(
            board.clone(),
            workers,
            feed.clone(),
            config.orchestrator_config(),
        );
        Self {
            board,
            feed,
            orchestrator,
            provider: oracle.provider_name().to_string(),
        }
    }

    pub fn worker_names(&self) -> Vec<&str> {
        self.orchestrator.workers().iter().map(|w| w.name()).collect()
    }

    /// Post one request and give every worker a single turn on it.
    pub async fn run_once(&mut self, text: &str) -> PassReport {
        self.board.append(USER_SENDER, text).await;
        self.feed.flush(&self.board).await;
        let report = self.orchestrator.run_pass().await;
        info!(messages = self.board.len().await, "request handled");
        report
    }
}
