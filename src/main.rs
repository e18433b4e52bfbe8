//! Subrag CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use subrag::cli::present::Reported;
use subrag::cli::{commands, Cli, Commands, Output};
use subrag::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Command failures have already been shown as notices
            if !e.is::<Reported>() {
                Output::error(&format!("{:#}", e));
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration. `config` must work even when the file is invalid.
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = match cli.command {
        Commands::Config { .. } => Settings::read_from(&config_path)?,
        _ => Settings::load_from(Some(&config_path))?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("subrag={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let api_key = settings.resolve_api_key(cli.api_key);

    // Execute command
    match cli.command {
        Commands::Session { path } => {
            commands::run_session(path, api_key, settings).await?;
        }

        Commands::Inspect { path } => {
            commands::run_inspect(path, settings)?;
        }

        Commands::Retrieve { question, path, top_k } => {
            commands::run_retrieve(&question, path, top_k, api_key, settings).await?;
        }

        Commands::Ask {
            question,
            path,
            top_k,
            model,
        } => {
            commands::run_ask(&question, path, top_k, model, api_key, settings).await?;
        }

        Commands::Eva { model } => {
            commands::run_eva(model, api_key, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings, config_path)?;
        }
    }

    Ok(())
}
