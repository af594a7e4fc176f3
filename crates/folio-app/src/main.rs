mod cli;
mod commands;
mod settings;
mod view;

use std::process::ExitCode;

use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use folio_common::Result;
use folio_config::{FolioConfig, LogLevel};

use cli::{Args, Command};

/// `--log-level` beats `RUST_LOG`, which beats the config file.
fn init_logging(cli_level: Option<&str>, config_level: LogLevel) {
    let filter = match cli_level {
        Some(level) => EnvFilter::from_default_env().add_directive(
            level
                .parse::<Directive>()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        ),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config_level.as_str())),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<FolioConfig> {
    let mut config = match &args.config {
        Some(path) => folio_config::load_config_from(path)?,
        None => folio_config::load_config()?,
    };
    settings::apply_overrides(&mut config, args);
    Ok(config)
}

async fn run(args: Args, config: FolioConfig) -> Result<()> {
    match args.command() {
        Command::Watch => commands::watch(&config).await,
        Command::Once { timeout_secs } => commands::once(&config, timeout_secs).await,
        Command::Config => {
            commands::print_config(&config);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Logging depends on the config, so load errors are reported after init.
    let loaded = load_config(&args);
    let config_level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(args.log_level.as_deref(), config_level);

    tracing::info!("folio v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    // Loading only parses; range problems are reported here, once.
    if let Err(e) = folio_config::validation::validate(&config) {
        tracing::warn!("{e}");
    }
    tracing::debug!(url = %config.presence.url, user_id = %config.presence.user_id, "config loaded");

    match run(args, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
