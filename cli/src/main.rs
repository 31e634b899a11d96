//! CLI entrypoint for Hydra Code
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use hydra_application::{
    AutoAcceptConfirmation, AutoRejectConfirmation, CollaborateUseCase, ConfirmationPort,
    SessionController, SessionParams,
};
use hydra_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, LocalToolExecutor, OpenAiCompatibleClient,
};
use hydra_presentation::{Cli, InteractiveConfirmation, Repl, ReplConfig};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    // Keep the guard alive so the file writer flushes on exit
    let _log_guard = init_logging(&cli, &config);

    info!("Starting Hydra Code");

    // === Validation ===
    let env = |key: &str| std::env::var(key).ok();
    let issues = config.validate(&env);
    for issue in &issues {
        eprintln!("{}", issue);
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Invalid configuration");
    }

    let registry = config
        .to_role_registry(&env)
        .context("Failed to build role registry")?;
    let default_role = match cli.role {
        Some(ref name) => match registry.resolve(name) {
            Some(role) => Some(role.id.to_string()),
            None => bail!("Unknown role: {}", name),
        },
        None => None,
    };
    let working_dir = resolve_working_dir(&cli, &config)?;
    let params = session_params(&cli, &config, default_role, &working_dir);

    // === Dependency Injection ===
    let backend = Arc::new(OpenAiCompatibleClient::new()?);
    let tools = Arc::new(LocalToolExecutor::new().with_working_dir(working_dir));

    // Interactive prompts are answered by the REPL over this channel
    let one_shot = cli.prompt.is_some();
    let mut prompts = None;
    let confirmation: Arc<dyn ConfirmationPort> = if !one_shot || std::io::stdin().is_terminal() {
        let (interactive, rx) = InteractiveConfirmation::channel();
        prompts = Some(rx);
        Arc::new(interactive)
    } else if cli.auto_approve {
        Arc::new(AutoAcceptConfirmation)
    } else {
        Arc::new(AutoRejectConfirmation)
    };

    let mut use_case =
        CollaborateUseCase::new(backend, tools, params).with_confirmation(confirmation);
    if let Some(ref path) = config.logging.conversation_log {
        match JsonlConversationLogger::open(path) {
            Ok(logger) => {
                info!("Conversation log: {}", logger.path().display());
                use_case = use_case.with_conversation_logger(Arc::new(logger));
            }
            Err(e) => warn!("Could not open conversation log {}: {}", path, e),
        }
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let controller = SessionController::new(use_case, registry, tx);

    let repl_config = ReplConfig::default()
        .with_show_progress(config.repl.show_progress && !cli.quiet)
        .with_verbose_tools(cli.verbose > 0)
        .with_history_file(config.repl.history_file.as_ref().map(PathBuf::from));
    let mut repl = Repl::new(controller, rx, repl_config);
    if let Some(prompts) = prompts {
        repl = repl.with_prompts(prompts);
    }

    if cli.complex {
        repl.apply_command("/complex");
    }

    match cli.prompt {
        Some(ref prompt) => {
            repl.run_request(prompt).await;
            if repl.last_run_failed() {
                return Ok(ExitCode::FAILURE);
            }
        }
        None => repl.run().await?,
    }

    Ok(ExitCode::SUCCESS)
}

/// Stderr logging from `-v`/config (RUST_LOG wins), plus an optional
/// daily-rolling file.
fn init_logging(cli: &Cli, config: &FileConfig) -> Option<WorkerGuard> {
    let level = match cli.verbose {
        0 if config.verbose => "info",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match config.logging.file {
        Some(ref file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let prefix = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "hydra.log".to_string());
            let appender = tracing_appender::rolling::daily(dir, prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// `-C` wins over `working_directory` in config; both default to the
/// current directory.
fn resolve_working_dir(cli: &Cli, config: &FileConfig) -> Result<PathBuf> {
    let dir = match (&cli.working_dir, &config.working_directory) {
        (Some(dir), _) => dir.clone(),
        (None, Some(dir)) => PathBuf::from(dir),
        (None, None) => std::env::current_dir().context("Cannot determine current directory")?,
    };
    if !dir.is_dir() {
        bail!("Working directory does not exist: {}", dir.display());
    }
    Ok(dir)
}

fn session_params(
    cli: &Cli,
    config: &FileConfig,
    default_role: Option<String>,
    working_dir: &Path,
) -> SessionParams {
    let mut params = config
        .to_session_params()
        .with_working_dir(working_dir.display().to_string());
    if let Some(role) = default_role {
        params = params.with_default_role(role);
    }
    if cli.auto_approve {
        params = params.with_auto_approve(true);
    }
    params
}
