//! proxy-launcher: bootstraps the credential proxy for a dependency update job.
//!
//! This is the main entry point. It parses the CLI, loads configuration,
//! initializes telemetry and dispatches the subcommand.
//!
//! # I/O Architecture
//!
//! - **Step outputs and state**: written to the runner's `GITHUB_OUTPUT` and
//!   `GITHUB_STATE` files
//! - **Debug logging**: `tracing` to stderr
//! - **Failures**: a single `::error::` annotation on stdout, exit status 1

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use proxy_launcher::{
    actions::error_annotation, cli::Cli, cli_handler, config::ConfigLoader, telemetry,
};
use tracing::debug;

fn main() -> ExitCode {
    // Parse CLI arguments first (before any other initialization)
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", error_annotation(&format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose)?;

    debug!("Parsed CLI arguments: {:?}", cli);

    // Load configuration with hierarchy merging
    let config = ConfigLoader::new()
        .load(&cli)
        .context("Failed to load configuration")?;

    debug!("Loaded configuration: {:?}", config);

    telemetry::init_logger(config.telemetry.audit_log.as_deref())
        .context("Failed to initialize telemetry")?;

    cli_handler::handle_command(cli.command, &config)
}

/// Initialize the tracing subscriber for debug/development logging.
///
/// This is separate from the audit telemetry. Debug logs go to stderr so
/// stdout stays reserved for workflow commands.
///
/// # Verbosity Levels
/// - 0 (default): Only warnings and errors
/// - 1 (-v): Info level
/// - 2 (-vv): Debug level
/// - 3+ (-vvv): Trace level
fn init_tracing(verbose: u8) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    Ok(())
}
