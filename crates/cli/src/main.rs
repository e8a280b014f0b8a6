//! Nanostore CLI - operator view of a nanostore robot

mod commands;
mod config;
mod logging;
mod output;
mod session;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{Commands, Context};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "nanostore")]
#[command(about = "Operator view of a nanostore robotic storage system")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Configuration file (defaults to <config dir>/nanostore/config.toml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API origin, overriding the configuration
    #[arg(long, global = true, env = "NANOSTORE_API_ORIGIN")]
    api_origin: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "NANOSTORE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Timeout for one-shot commands in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "60")]
    timeout: u64,

    /// Also append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_level.into(), cli.log_file.as_deref(), cli.log_json)?;

    let mut dashboard = config::load_config(cli.config.as_deref())?;
    if let Some(origin) = cli.api_origin {
        dashboard.api_origin = origin;
    }
    let context = Context::new(dashboard, cli.token);

    // Watch runs until interrupted, so the timeout never applies to it
    if cli.timeout == 0 || cli.command.is_long_running() {
        match cli.command.execute(context).await {
            Ok(()) => {
                info!("Command completed successfully");
            }
            Err(e) => {
                error!("Command failed: {e:#}");
                std::process::exit(1);
            }
        }
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(context)).await {
            Ok(Ok(())) => {
                info!("Command completed successfully");
            }
            Ok(Err(e)) => {
                error!("Command failed: {e:#}");
                std::process::exit(1);
            }
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
