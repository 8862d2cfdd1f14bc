//! chalkboard: multi-agent collaboration on a shared board
//!
//! Usage:
//!   chalkboard                               → interactive session, editorial roster
//!   chalkboard --roster moderated            → add the moderator and a noisy agent
//!   chalkboard --once "Write about cats"     → one request, one pass, exit
//!   chalkboard --print-config                → show the effective configuration

use anyhow::Context;
use chalkboard::config::AppConfig;
use chalkboard::display::{self, TerminalObserver};
use chalkboard::{console, System};
use chalkboard_agent::Roster;
use chalkboard_core::Error;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

#[derive(Parser)]
#[command(
    name = "chalkboard",
    about = "LLM agents collaborating through a shared blackboard",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long, default_value = "chalkboard.toml")]
    config: PathBuf,

    /// LLM provider: openai, gemini or anthropic (or set LLM_PROVIDER)
    #[arg(short, long)]
    provider: Option<String>,

    /// Worker roster: editorial, moderated, stress or brain
    #[arg(short, long)]
    roster: Option<Roster>,

    /// Messages each worker sees (or set CONTEXT_WINDOW)
    #[arg(long)]
    context_window: Option<usize>,

    /// Soft word limit per contribution (or set AGENT_WORD_LIMIT)
    #[arg(long)]
    word_limit: Option<usize>,

    /// Post negative decisions to the board (or set DEBUG_DECISIONS)
    #[arg(long, default_value_t = false)]
    debug_decisions: bool,

    /// Verbose logging (or set DEBUG)
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Post one request, give every worker one turn, then exit
    #[arg(long)]
    once: Option<String>,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Directory for prompts.log (decision and generation traffic)
    #[arg(long)]
    prompt_log: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long, default_value_t = false)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(p) = &self.provider {
            config.provider = p.trim().to_lowercase();
        }
        if let Some(r) = self.roster {
            config.roster = r;
        }
        if let Some(n) = self.context_window {
            config.context_window = n;
        }
        if let Some(n) = self.word_limit {
            config.word_limit = n;
        }
        config.debug_decisions |= self.debug_decisions;
        config.debug |= self.debug;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let early_debug = cli.debug || AppConfig::debug_from_env(|name| std::env::var(name).ok());
    let logging = init_tracing(early_debug, cli.log_file.as_deref(), cli.prompt_log.as_deref())?;

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("reading {}", cli.config.display()))?;
    config.apply_env();
    cli.apply(&mut config);
    if config.debug != early_debug {
        logging.set_debug(config.debug);
    }

    if cli.print_config {
        println!("{}", config.to_toml());
        return Ok(());
    }

    let oracle = match chalkboard::connect(&config) {
        Ok(oracle) => oracle,
        Err(Error::MissingCredentials(vars)) => {
            display::print_missing(&vars);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    if !config.validate() {
        tracing::warn!(
            configured = %config.provider,
            using = oracle.provider_name(),
            "configured provider has no credentials"
        );
    }

    let mut system = System::assemble(&config, oracle, TerminalObserver::new());

    if let Some(text) = &cli.once {
        let report = system.run_once(text).await;
        tracing::info!(acted = ?report.acted().collect::<Vec<_>>(), "done");
        return Ok(());
    }

    display::print_banner(&system.provider, config.roster.as_str(), &system.worker_names());
    run_interactive(system).await?;
    display::print_goodbye();
    Ok(())
}

async fn run_interactive(system: System) -> anyhow::Result<()> {
    let System {
        board,
        feed,
        orchestrator,
        ..
    } = system;
    let stop = orchestrator.stop_token();
    let loop_handle = tokio::spawn(orchestrator.run());

    tokio::select! {
        result = console::run(console::stdin_lines(), &board, &feed, true) => {
            let posted = result?;
            tracing::debug!(posted, "input loop finished");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::debug!("interrupted");
        }
    }

    stop.cancel();
    let passes = loop_handle.await?;
    tracing::info!(passes, messages = board.len().await, "session ended");
    Ok(())
}

/// Keeps the log writers alive and lets the config file raise verbosity
/// after tracing is already running.
struct Logging {
    _guards: Vec<WorkerGuard>,
    filter: reload::Handle<EnvFilter, Registry>,
    prompt_log: bool,
}

impl Logging {
    fn set_debug(&self, debug: bool) {
        if let Err(e) = self.filter.reload(main_filter(debug, self.prompt_log)) {
            tracing::warn!(error = %e, "could not change log level");
        }
    }
}

fn main_filter(debug: bool, prompt_log: bool) -> EnvFilter {
    // With a prompt log, prompt traffic goes there and nowhere else.
    let default_filter = match (debug, prompt_log) {
        (true, false) => "chalkboard=debug,prompts=info",
        (true, true) => "chalkboard=debug,prompts=off",
        (false, _) => "chalkboard=info,prompts=off",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into())
}

fn init_tracing(
    debug: bool,
    log_file: Option<&Path>,
    prompt_log: Option<&Path>,
) -> anyhow::Result<Logging> {
    let mut guards = Vec::new();
    let (filter, handle) = reload::Layer::new(main_filter(debug, prompt_log.is_some()));

    let writer = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            guards.push(guard);
            BoxMakeWriter::new(writer)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let main_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(log_file.is_none())
        .with_filter(filter);

    let prompt_layer = match prompt_log {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, "prompts.log"));
            guards.push(guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(Targets::new().with_target("prompts", LevelFilter::INFO)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(main_layer)
        .with(prompt_layer)
        .init();
    Ok(Logging {
        _guards: guards,
        filter: handle,
        prompt_log: prompt_log.is_some(),
    })
}

fn file_appender(path: &Path) -> anyhow::Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("not a file path: {}", path.display()))?;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    Ok(tracing_appender::rolling::never(dir, name))
}
