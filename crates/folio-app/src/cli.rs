use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// folio — live presence for the portfolio, streamed from the relay.
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subscribe to this account instead of the configured one.
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Relay WebSocket URL override.
    #[arg(long, global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Stream presence changes as JSON lines until Ctrl-C (default).
    Watch,
    /// Print the first full presence state and exit.
    Once {
        /// Give up if no state arrives within this many seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print the effective configuration as JSON.
    Config,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Watch)
    }
}

pub fn parse() -> Args {
    Args::parse()
}
