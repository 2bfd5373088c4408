//! Command-line interface definitions for proxy-launcher.
//!
//! Uses clap's derive API for type-safe argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Launches the credential proxy for a dependency update job.
///
/// `start` generates an ephemeral CA, hands it and the registry credentials to
/// the proxy binary, and publishes the proxy's address and CA certificate as
/// step outputs. `stop` terminates the proxy from the post step.
#[derive(Parser, Debug)]
#[command(name = "proxy-launcher")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Path to additional config file.
    ///
    /// Merged on top of system and user configs, giving it the highest
    /// priority except for CLI flags.
    #[arg(short = 'c', long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Append JSON audit events to this file.
    #[arg(long = "audit-log", value_name = "PATH", global = true)]
    pub audit_log: Option<PathBuf>,

    /// Increase log verbosity.
    ///
    /// Can be specified multiple times:
    /// -v    = info level
    /// -vv   = debug level
    /// -vvv  = trace level
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Subcommands for proxy-launcher.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a CA, launch the proxy, and publish its address.
    Start {
        /// Path to the proxy executable.
        #[arg(long = "proxy-binary", value_name = "PATH", env = "PROXY_BINARY")]
        proxy_binary: Option<PathBuf>,

        /// Directory for the proxy log file.
        #[arg(long = "log-dir", value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },

    /// Terminate a previously launched proxy.
    ///
    /// Without `--pid`, the pid persisted by `start` is read from the
    /// `STATE_proxy_pid` environment variable.
    Stop {
        /// Pid of the proxy to stop.
        #[arg(long = "pid")]
        pid: Option<u32>,
    },
}
