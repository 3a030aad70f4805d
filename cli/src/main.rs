//! CLI entrypoint for Aura chat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::Result;
use aura_application::{ChatController, NoChatProgress};
use aura_domain::SessionConfig;
use aura_infrastructure::{ConfigLoader, HostModelGateway, JsonlTranscriptLogger};
use aura_presentation::{ChatRepl, Cli, ConsoleFormatter, ConsoleProgress, StartupSpinner};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // The appender guard must outlive main so buffered lines get flushed
    let _log_guard = match &config.log.file {
        Some(file) => {
            let path = PathBuf::from(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."))
                .to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "aura.log".into());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    };

    info!("Starting Aura chat");

    // CLI flags override config file values
    let command = cli.host.unwrap_or_else(|| config.model.command.clone());
    let top_k = cli.top_k.or(config.model.top_k);

    let mut session_config = SessionConfig::new();
    if let Some(top_k) = top_k {
        session_config = session_config.with_top_k(top_k);
    }

    // === Dependency Injection ===
    let gateway = Arc::new(HostModelGateway::with_command(command));

    let mut controller = ChatController::new(gateway, session_config);
    if let Some(path) = &config.log.transcript_file
        && let Some(logger) = JsonlTranscriptLogger::new(path)
    {
        controller = controller.with_transcript_logger(Arc::new(logger));
    }

    // One-time availability check + session creation; failures surface as
    // transcript notices, never as process errors
    let show_progress = !cli.quiet && config.repl.show_progress;
    if show_progress {
        let spinner = StartupSpinner::start("Waiting for model...");
        controller.initialize().await;
        spinner.finish();
    } else {
        controller.initialize().await;
    }

    // One-shot mode - a prompt was given and chat mode not forced
    if let Some(prompt) = cli.prompt.filter(|_| !cli.chat) {
        println!(
            "{}",
            ConsoleFormatter::format_status(controller.is_online())
        );

        // No session: the transcript carries the explanatory notice
        if !controller.is_online() {
            println!(
                "{}",
                ConsoleFormatter::format_transcript(controller.transcript())
            );
            return Ok(());
        }

        controller.set_input(prompt);
        let turns_before = controller.transcript().len();

        if show_progress {
            controller.submit(&ConsoleProgress::new()).await;
            // Streamed output was printed live; surface a trailing failure
            // notice if one was appended
            let turns = controller.transcript().turns();
            if turns.len() >= turns_before + 3
                && let Some(last) = turns.last()
            {
                println!("{}", ConsoleFormatter::format_turn(last));
            }
        } else {
            controller.submit(&NoChatProgress).await;
            for turn in controller.transcript().turns().iter().skip(turns_before + 1) {
                println!("{}", ConsoleFormatter::format_turn(turn));
            }
        }
        return Ok(());
    }

    // Chat mode
    let mut repl = ChatRepl::new(controller)
        .with_progress(show_progress)
        .with_history_file(config.repl.history_file.as_deref().map(PathBuf::from));
    repl.run().await?;

    Ok(())
}
