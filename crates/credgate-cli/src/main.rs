use anyhow::{Context, Result};
use clap::Parser;

use credgate_cli::cli::{Cli, Commands};
use credgate_cli::commands::{self, CommandStatus, ERROR_EXIT_CODE};
use credgate_cli::config::loader::load_config;
use credgate_cli::observability;
use credgate_cli::output::print_error;

#[tokio::main]
async fn main() {
    // Load .env before parsing so it can feed CREDGATE_* arguments
    let _ = dotenvy::dotenv();
    observability::init_tracing();

    let code = match run().await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            print_error(&format!("{e:#}"));
            ERROR_EXIT_CODE
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<CommandStatus> {
    let cli = Cli::parse();

    let config = load_config(Some(cli.config.as_str()))
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    observability::apply_logging_level(&config.logging.level);
    tracing::debug!(path = %cli.config, "Configuration loaded");

    match &cli.command {
        Commands::Hash(args) => {
            commands::hash::run(args)?;
            Ok(CommandStatus::Success)
        }
        Commands::Authenticate(args) => commands::authenticate::run(args, &config).await,
        Commands::Config => {
            commands::config::show(&config)?;
            Ok(CommandStatus::Success)
        }
    }
}
