//! Runtime configuration
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables, then by command-line flags in `main`. Falls back to defaults
//! when no file exists.

use chalkboard_agent::{OrchestratorConfig, Persona, Roster, WorkerConfig};
use chalkboard_core::{Error, Result};
use chalkboard_llm::{AnthropicProvider, GeminiProvider, LlmProvider, OpenAiProvider};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Provider order used when the configured one is unavailable.
pub const PROVIDER_ORDER: [&str; 3] = ["openai", "gemini", "anthropic"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Preferred provider: `openai`, `gemini` or `anthropic`.
    pub provider: String,
    /// Built-in persona set to run.
    pub roster: Roster,
    /// Messages a worker sees when deciding and generating.
    pub context_window: usize,
    /// Soft word limit passed to every generation.
    pub word_limit: usize,
    pub debug: bool,
    /// Post negative decisions to the board.
    pub debug_decisions: bool,
    /// Post a "working on this task" notice before generating.
    pub announce_work: bool,
    pub poll_interval_ms: u64,
    /// Per-request HTTP timeout for providers.
    pub request_timeout_secs: u64,
    pub openai: ProviderConfig,
    pub gemini: ProviderConfig,
    pub anthropic: ProviderConfig,
    /// Extra personas appended after the roster.
    pub personas: Vec<Persona>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Only ever read from the environment or the config file; never written back.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn with_model(model: &str) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            max_tokens: 500,
            temperature: 0.7,
            base_url: None,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    fn key(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::with_model("")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            roster: Roster::default(),
            context_window: 5,
            word_limit: 100,
            debug: false,
            debug_decisions: false,
            announce_work: true,
            poll_interval_ms: 500,
            request_timeout_secs: 60,
            openai: ProviderConfig::with_model("gpt-3.5-turbo"),
            gemini: ProviderConfig::with_model("gemini-1.5-flash"),
            anthropic: ProviderConfig::with_model("claude-haiku-4-5-20251001"),
            personas: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file. A missing file yields defaults; a malformed one
    /// is an error.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_toml(&content)?;
                tracing::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML, without credentials.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup. Values that fail to parse
    /// are ignored with a warning.
    pub fn apply_env_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LLM_PROVIDER") {
            self.provider = v.trim().to_lowercase();
        }
        for (prefix, provider) in [
            ("OPENAI", &mut self.openai),
            ("GEMINI", &mut self.gemini),
            ("ANTHROPIC", &mut self.anthropic),
        ] {
            if let Some(v) = get(&format!("{}_API_KEY", prefix)) {
                provider.api_key = Some(v);
            }
            if let Some(v) = get(&format!("{}_MODEL", prefix)) {
                provider.model = v;
            }
            parse_into(&get, &format!("{}_MAX_TOKENS", prefix), &mut provider.max_tokens);
            parse_into(&get, &format!("{}_TEMPERATURE", prefix), &mut provider.temperature);
            if let Some(v) = get(&format!("{}_BASE_URL", prefix)) {
                provider.base_url = Some(v);
            }
        }
        parse_into(&get, "CONTEXT_WINDOW", &mut self.context_window);
        parse_into(&get, "AGENT_WORD_LIMIT", &mut self.word_limit);
        if let Some(v) = get("DEBUG") {
            self.debug = parse_flag(&v);
        }
        if let Some(v) = get("DEBUG_DECISIONS") {
            self.debug_decisions = parse_flag(&v);
        }
    }

    /// The `DEBUG` flag on its own, for use before the config file is read.
    pub fn debug_from_env<F>(get: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        get("DEBUG").is_some_and(|v| parse_flag(&v))
    }

    /// Whether the configured provider has its credentials.
    pub fn validate(&self) -> bool {
        self.missing_vars().is_empty()
    }

    /// Environment variables the configured provider still needs.
    pub fn missing_vars(&self) -> Vec<String> {
        match self.provider_config(&self.provider) {
            Some(p) if !p.has_key() => {
                vec![format!("{}_API_KEY", self.provider.to_uppercase())]
            }
            _ => Vec::new(),
        }
    }

    /// Fail with the missing variables when no provider at all has a key.
    pub fn require_credentials(&self) -> Result<()> {
        if PROVIDER_ORDER
            .iter()
            .filter_map(|name| self.provider_config(name))
            .any(ProviderConfig::has_key)
        {
            return Ok(());
        }
        let mut missing = self.missing_vars();
        if missing.is_empty() {
            missing = PROVIDER_ORDER
                .iter()
                .map(|name| format!("{}_API_KEY", name.to_uppercase()))
                .collect();
        }
        Err(Error::MissingCredentials(missing))
    }

    pub fn provider_config(&self, name: &str) -> Option<&ProviderConfig> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(&self.openai),
            "gemini" => Some(&self.gemini),
            "anthropic" => Some(&self.anthropic),
            _ => None,
        }
    }

    /// Every provider in fallback order, configured or not. Feed this to
    /// `select_provider`.
    pub fn providers(&self) -> Vec<Arc<dyn LlmProvider>> {
        let timeout = Duration::from_secs(self.request_timeout_secs);

        let mut openai = OpenAiProvider::new(self.openai.key())
            .with_model(&self.openai.model)
            .with_defaults(self.openai.max_tokens, self.openai.temperature)
            .with_timeout(timeout);
        if let Some(url) = &self.openai.base_url {
            openai = openai.with_base_url(url);
        }

        let mut gemini = GeminiProvider::new(self.gemini.key())
            .with_model(&self.gemini.model)
            .with_defaults(self.gemini.max_tokens, self.gemini.temperature)
            .with_timeout(timeout);
        if let Some(url) = &self.gemini.base_url {
            gemini = gemini.with_base_url(url);
        }

        let mut anthropic = AnthropicProvider::new(self.anthropic.key())
            .with_model(&self.anthropic.model)
            .with_defaults(self.anthropic.max_tokens, self.anthropic.temperature)
            .with_timeout(timeout);
        if let Some(url) = &self.anthropic.base_url {
            anthropic = anthropic.with_base_url(url);
        }

        vec![Arc::new(openai), Arc::new(gemini), Arc::new(anthropic)]
    }

    /// Roster personas followed by any declared in the config file.
    pub fn personas(&self) -> Vec<Persona> {
        let mut personas = self.roster.personas();
        personas.extend(self.personas.iter().cloned());
        personas
    }

    pub fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            window_size: self.context_window,
            max_words: self.word_limit,
            announce_work: self.announce_work,
            debug_decisions: self.debug_decisions,
        }
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_passes: None,
        }
    }
}

fn parse_into<T, G>(get: &G, name: &str, slot: &mut T)
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    if let Some(raw) = get(name) {
        match raw.trim().parse() {
            Ok(v) => *slot = v,
            Err(_) => tracing::warn!("Ignoring {}={:?}: not a valid value", name, raw),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let c = AppConfig::default();
        assert_eq!(c.provider, "openai");
        assert_eq!(c.context_window, 5);
        assert_eq!(c.word_limit, 100);
        assert_eq!(c.openai.model, "gpt-3.5-turbo");
        assert_eq!(c.openai.max_tokens, 500);
        assert_eq!(c.gemini.model, "gemini-1.5-flash");
        assert!(!c.debug_decisions);
        assert!(c.announce_work);
    }

    #[test]
    fn env_overrides() {
        let mut c = AppConfig::default();
        c.apply_env_from(env(&[
            ("LLM_PROVIDER", " Gemini "),
            ("GEMINI_API_KEY", "g-key"),
            ("GEMINI_TEMPERATURE", "0.2"),
            ("CONTEXT_WINDOW", "8"),
            ("AGENT_WORD_LIMIT", "40"),
            ("DEBUG_DECISIONS", "TRUE"),
        ]));
        assert_eq!(c.provider, "gemini");
        assert_eq!(c.gemini.api_key.as_deref(), Some("g-key"));
        assert_eq!(c.gemini.temperature, 0.2);
        assert_eq!(c.context_window, 8);
        assert_eq!(c.word_limit, 40);
        assert!(c.debug_decisions);
        assert!(!c.debug);
    }

    #[test]
    fn debug_flag_before_load() {
        assert!(AppConfig::debug_from_env(env(&[("DEBUG", "yes")])));
        assert!(AppConfig::debug_from_env(env(&[("DEBUG", " TRUE ")])));
        assert!(!AppConfig::debug_from_env(env(&[("DEBUG", "0")])));
        assert!(!AppConfig::debug_from_env(env(&[])));
    }

    #[test]
    fn bad_numbers_keep_previous_value() {
        let mut c = AppConfig::default();
        c.apply_env_from(env(&[("CONTEXT_WINDOW", "lots"), ("OPENAI_MAX_TOKENS", "-1")]));
        assert_eq!(c.context_window, 5);
        assert_eq!(c.openai.max_tokens, 500);
    }

    #[test]
    fn missing_vars_for_configured_provider() {
        let c = AppConfig::default();
        assert!(!c.validate());
        assert_eq!(c.missing_vars(), vec!["OPENAI_API_KEY"]);

        let mut c = AppConfig::default();
        c.apply_env_from(env(&[("OPENAI_API_KEY", "sk-test")]));
        assert!(c.validate());
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut c = AppConfig::default();
        c.openai.api_key = Some("   ".into());
        assert_eq!(c.missing_vars(), vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn require_credentials_accepts_any_provider() {
        let mut c = AppConfig::default();
        assert!(matches!(
            c.require_credentials(),
            Err(Error::MissingCredentials(v)) if v == vec!["OPENAI_API_KEY"]
        ));
        c.anthropic.api_key = Some("a-key".into());
        assert!(c.require_credentials().is_ok());
    }

    #[test]
    fn providers_in_fallback_order() {
        let mut c = AppConfig::default();
        c.gemini.api_key = Some("g".into());
        let providers = c.providers();
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, PROVIDER_ORDER);
        let available: Vec<_> = providers.iter().map(|p| p.is_available()).collect();
        assert_eq!(available, vec![false, true, false]);
    }

    #[test]
    fn personas_follow_roster() {
        let mut c = AppConfig::default();
        c.personas.push(Persona::new("poet-agent", "Write poems", "You write poems.", ""));
        let names: Vec<_> = c.personas().into_iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            vec!["writer-agent", "editor-agent", "grammar-agent", "poet-agent"]
        );
    }

    #[test]
    fn toml_never_contains_keys() {
        let mut c = AppConfig::default();
        c.openai.api_key = Some("sk-secret".into());
        let rendered = c.to_toml();
        assert!(!rendered.contains("sk-secret"));
        let back = AppConfig::from_toml(&rendered).unwrap();
        assert_eq!(back.openai.model, c.openai.model);
        assert!(back.openai.api_key.is_none());
    }
}
