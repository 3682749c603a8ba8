//! CLI entrypoint for accord
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use accord_application::{NegotiationEngine, NegotiationLogger};
use accord_domain::{ConfigIssue, Severity};
use accord_infrastructure::{
    AgentRoster, ConfigLoader, FileConfig, InMemoryNegotiationStore, JsonlNegotiationLogger,
    OpenAiCompletionService,
};
use accord_presentation::{
    Cli, Command, ConsoleFormatter, OutputFormat, ProgressMode, SimulateArgs, SimulationRunner,
};
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(cli.verbose, cli.log_file.as_deref())?;

    info!("Starting accord");

    match &cli.command {
        Command::ShowConfig => {
            show_config(&cli);
            Ok(())
        }
        Command::Simulate(args) => {
            let config = load_config(&cli)?;
            simulate(&cli, args, config).await
        }
    }
}

/// `RUST_LOG` wins over `-v`; with `--log-file` logs go to that file instead of stderr.
fn init_tracing(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            Severity::Warning => eprintln!("warning: {}", issue.message),
            Severity::Error => eprintln!("error: {}", issue.message),
        }
    }
    if ConfigIssue::any_errors(&issues) {
        bail!("Invalid configuration ({} issue(s))", issues.len());
    }
    Ok(config)
}

fn show_config(cli: &Cli) {
    println!("Configuration sources (lowest to highest priority):");
    println!("  defaults (built-in)");
    for source in ConfigLoader::sources(cli.config.as_deref()) {
        let marker = if source.found { "found" } else { "not found" };
        println!(
            "  {:<10} {} ({})",
            source.label,
            source.path.display(),
            marker
        );
    }
    if cli.no_config {
        println!("\n--no-config is set: only defaults apply.");
    }
}

async fn simulate(cli: &Cli, args: &SimulateArgs, config: FileConfig) -> Result<()> {
    let roster = AgentRoster::load(&args.agents)
        .with_context(|| format!("Failed to load roster {}", args.agents.display()))?;

    // === Dependency Injection ===
    let store = Arc::new(InMemoryNegotiationStore::new());
    for agent in &roster.agents {
        if let Some(profile) = &agent.profile {
            store
                .put_preference_profile(agent.id.clone(), profile.clone())
                .await;
        }
    }

    let api_key = config.completion.resolve_api_key();
    if api_key.is_none() {
        warn!(
            "No API key found in config or ${}",
            config.completion.api_key_env
        );
    }
    let completion = Arc::new(OpenAiCompletionService::new(
        &config.completion.base_url,
        api_key,
        config.completion.model.clone(),
        config.completion.request_timeout(),
    )?);
    info!(
        "Using model {} at {}",
        completion.model(),
        completion.endpoint()
    );

    let mut engine = NegotiationEngine::new(completion, store)
        .with_params(config.engine.to_engine_params());
    if let Some(path) = &config.logging.negotiation_log {
        match JsonlNegotiationLogger::new(path) {
            Some(logger) => {
                let logger: Arc<dyn NegotiationLogger> = Arc::new(logger);
                engine = engine.with_logger(logger);
            }
            None => warn!("Negotiation events will not be recorded"),
        }
    }
    if let Some(seed) = args.seed {
        engine = engine.with_seed(seed);
    }

    let progress = if cli.quiet || args.output == OutputFormat::Json {
        ProgressMode::Silent
    } else if std::io::stderr().is_terminal() {
        ProgressMode::Bars
    } else {
        ProgressMode::Lines
    };

    let cancellation = CancellationToken::new();
    let ctrl_c_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_token.cancel();
        }
    });

    let runner = SimulationRunner::new(Arc::new(engine), roster.ids())
        .with_rounds(args.rounds)
        .with_progress(progress)
        .with_cancellation(cancellation);
    let report = runner
        .run(&args.topic, args.description.as_deref())
        .await?;

    let output = match args.output {
        OutputFormat::Full => ConsoleFormatter::format(&report),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&report),
        OutputFormat::Json => ConsoleFormatter::format_json(&report),
    };

    println!("{}", output);

    Ok(())
}
