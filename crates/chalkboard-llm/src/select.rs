//! Provider selection at startup

use crate::provider::LlmProvider;
use chalkboard_core::{Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Pick the provider to run with: the preferred one if it is available,
/// otherwise the first available candidate in order. Fails when none is.
pub fn select_provider(
    preferred: &str,
    candidates: Vec<Arc<dyn LlmProvider>>,
) -> Result<Arc<dyn LlmProvider>> {
    let preferred = preferred.trim().to_lowercase();

    if let Some(p) = candidates
        .iter()
        .find(|p| p.name() == preferred && p.is_available())
    {
        info!(provider = p.name(), "Using configured LLM provider");
        return Ok(p.clone());
    }

    match candidates.into_iter().find(|p| p.is_available()) {
        Some(p) => {
            warn!(
                preferred = %preferred,
                provider = p.name(),
                "Configured provider unavailable, falling back"
            );
            Ok(p)
        }
        None => Err(Error::config("No LLM provider is properly configured")),
    }
}
