//! Subcommand dispatch for proxy-launcher.

use anyhow::{Context, Result};
use tracing::info;

use crate::actions::{EnvInputs, FileCommandSink};
use crate::cli::Commands;
use crate::config::Config;
use crate::orchestrator;
use crate::proxy::{RandomPortSelector, TokioLauncher};
use crate::teardown;

/// Handle a parsed subcommand against the loaded configuration.
pub fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Start { .. } => run_start(config),
        Commands::Stop { pid } => run_stop(pid),
    }
}

/// Launch the proxy on a single-threaded runtime.
fn run_start(config: &Config) -> Result<()> {
    let binary = config.proxy.binary()?.clone();
    let settings = config
        .proxy
        .supervisor_settings()
        .context("Invalid proxy settings")?;
    let log_file = config.proxy.log_file_path();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    rt.block_on(async {
        let mut sink = FileCommandSink::from_env();
        orchestrator::start_proxy(
            &EnvInputs,
            TokioLauncher,
            RandomPortSelector,
            &binary,
            &log_file,
            settings,
            &mut sink,
        )
        .await
        .map(|_| ())
    })
}

/// Stop a previously launched proxy.
fn run_stop(pid: Option<u32>) -> Result<()> {
    match teardown::stop(pid).context("Failed to stop proxy")? {
        Some(outcome) => info!("Teardown finished: {:?}", outcome),
        None => info!("No proxy to stop"),
    }
    Ok(())
}
